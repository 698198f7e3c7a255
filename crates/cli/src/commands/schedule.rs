// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vc schedule` - job queue and completion estimates

use anyhow::Result;
use clap::{Args, Subcommand};
use vc_core::JobState;
use vc_engine::{Advance, QueueSummary, ReportRow};
use vc_storage::{JobStates, Schedule};

use crate::client::DaemonClient;
use crate::output::{or_dash, print_json, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub command: ScheduleCommand,
}

#[derive(Subcommand)]
pub enum ScheduleCommand {
    /// Last saved completion estimates
    Show,
    /// Recompute completion estimates now
    Recompute,
    /// Complete the running job and start the next one
    Advance,
    /// Put registered vehicles to work on queued jobs
    Assign,
    /// Per-job durations, cumulative time and estimates
    Report,
    /// Lifecycle state of every job
    States,
    /// Job counts per state
    Summary,
}

pub async fn handle(
    command: ScheduleCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ScheduleCommand::Show => show_schedule(&client.schedule().await?, format)?,
        ScheduleCommand::Recompute => show_schedule(&client.recompute().await?, format)?,
        ScheduleCommand::Advance => {
            let advance = client.advance().await?;
            match format {
                OutputFormat::Text => println!("{}", describe_advance(&advance)),
                OutputFormat::Json => print_json(&advance)?,
            }
        }
        ScheduleCommand::Assign => {
            let count = client.assign_vehicles().await?;
            match format {
                OutputFormat::Text => println!("{count} vehicle(s) assigned"),
                OutputFormat::Json => print_json(&serde_json::json!({ "assigned": count }))?,
            }
        }
        ScheduleCommand::Report => {
            let rows = client.report().await?;
            match format {
                OutputFormat::Text if rows.is_empty() => println!("No scheduled jobs"),
                OutputFormat::Text => report_table(&rows).print()?,
                OutputFormat::Json => print_json(&rows)?,
            }
        }
        ScheduleCommand::States => {
            let states = client.job_states().await?;
            match format {
                OutputFormat::Text if states.is_empty() => println!("No jobs"),
                OutputFormat::Text => states_table(&states).print()?,
                OutputFormat::Json => print_json(&states)?,
            }
        }
        ScheduleCommand::Summary => {
            let summary = client.summary().await?;
            match format {
                OutputFormat::Text => summary_table(&summary).print()?,
                OutputFormat::Json => print_json(&summary)?,
            }
        }
    }
    Ok(())
}

fn show_schedule(schedule: &Schedule, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text if schedule.is_empty() => println!("No scheduled jobs"),
        OutputFormat::Text => schedule_table(schedule).print()?,
        OutputFormat::Json => print_json(schedule)?,
    }
    Ok(())
}

pub(crate) fn describe_advance(advance: &Advance) -> String {
    match (&advance.completed, &advance.started) {
        (None, None) => "Nothing to advance".to_string(),
        (completed, started) => format!(
            "Completed: {}, started: {}",
            or_dash(completed.as_ref()),
            or_dash(started.as_ref())
        ),
    }
}

pub(crate) fn schedule_table(schedule: &Schedule) -> Table {
    let mut table = Table::new(vec![Column::left("JOB"), Column::left("COMPLETION")]);
    for (job, completion) in schedule {
        table.row(vec![job.to_string(), completion.clone()]);
    }
    table
}

pub(crate) fn report_table(rows: &[ReportRow]) -> Table {
    let mut table = Table::new(vec![
        Column::left("JOB"),
        Column::right("DURATION"),
        Column::right("REMAINING"),
        Column::left("COMPLETION"),
        Column::left("STATE"),
    ]);
    for row in rows {
        table.row(vec![
            row.job_id.to_string(),
            row.duration.clone(),
            row.remaining.clone(),
            row.completion.clone(),
            row.state.to_string(),
        ]);
    }
    table
}

/// Sorted by job ID; the daemon reports states unordered.
pub(crate) fn states_table(states: &JobStates) -> Table {
    let mut entries: Vec<_> = states.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    let mut table = Table::new(vec![Column::left("JOB"), Column::left("STATE")]);
    for (job, state) in entries {
        table.row(vec![job.to_string(), state.to_string()]);
    }
    table
}

pub(crate) fn summary_table(summary: &QueueSummary) -> Table {
    let mut table = Table::new(vec![Column::left("STATE"), Column::right("JOBS")]);
    for state in JobState::ALL {
        table.row(vec![state.to_string(), summary.get(state).to_string()]);
    }
    table
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
