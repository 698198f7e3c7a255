// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Column-aligned text tables for list views.

use std::io::Write;

pub enum Align {
    Left,
    Right,
}

pub struct Column {
    pub name: &'static str,
    pub align: Align,
    /// Longer values are cut to this many characters
    pub max_width: Option<usize>,
}

impl Column {
    pub fn left(name: &'static str) -> Self {
        Self {
            name,
            align: Align::Left,
            max_width: None,
        }
    }

    pub fn right(name: &'static str) -> Self {
        Self {
            name,
            align: Align::Right,
            max_width: None,
        }
    }

    pub fn with_max(mut self, max: usize) -> Self {
        self.max_width = Some(max);
        self
    }
}

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

const SEP: &str = "  ";

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Header plus rows; nothing at all when there are no rows.
    ///
    /// A trailing left-aligned column is never padded.
    pub fn render(&self, out: &mut impl Write) -> std::io::Result<()> {
        if self.rows.is_empty() {
            return Ok(());
        }
        let widths = self.widths();
        let header: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        self.write_line(out, &widths, &header)?;
        for row in &self.rows {
            let cells: Vec<&str> = (0..self.columns.len())
                .map(|i| row.get(i).map_or("", String::as_str))
                .collect();
            self.write_line(out, &widths, &cells)?;
        }
        Ok(())
    }

    pub fn print(&self) -> std::io::Result<()> {
        self.render(&mut std::io::stdout().lock())
    }

    fn write_line(
        &self,
        out: &mut impl Write,
        widths: &[usize],
        cells: &[&str],
    ) -> std::io::Result<()> {
        let last = self.columns.len().saturating_sub(1);
        let line: Vec<String> = self
            .columns
            .iter()
            .zip(cells)
            .enumerate()
            .map(|(i, (col, cell))| {
                let text = truncate(cell, col.max_width);
                match col.align {
                    Align::Left if i == last => text.to_string(),
                    Align::Left => format!("{:<width$}", text, width = widths[i]),
                    Align::Right => format!("{:>width$}", text, width = widths[i]),
                }
            })
            .collect();
        writeln!(out, "{}", line.join(SEP))
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .map(|row| {
                        let cell = row.get(i).map_or("", String::as_str);
                        truncate(cell, col.max_width).chars().count()
                    })
                    .fold(col.name.len(), usize::max)
            })
            .collect()
    }
}

fn truncate(s: &str, max: Option<usize>) -> &str {
    match max.and_then(|m| s.char_indices().nth(m)) {
        Some((cut, _)) => &s[..cut],
        None => s,
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
