// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp and duration text formats shared by the store, scheduler and wire.

use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

/// Format used for created/registered timestamps and completion estimates.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used for job deadlines.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Duration text could not be interpreted as a positive `HH:MM:SS` span.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("expected HH:MM:SS, got {0:?}")]
    Format(String),
    #[error("field out of range in {0:?}")]
    Range(String),
    #[error("duration {0:?} is not positive")]
    NotPositive(String),
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT).ok()
}

/// Parse `HH:MM:SS` into a positive span.
///
/// Each field is exactly two digits; hours are 00-23, minutes and seconds 00-59.
pub fn parse_hms(text: &str) -> Result<Duration, DurationError> {
    let fields: Vec<&str> = text.trim().split(':').collect();
    if fields.len() != 3
        || fields
            .iter()
            .any(|f| f.len() != 2 || !f.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(DurationError::Format(text.to_string()));
    }

    let parse = |f: &str| f.parse::<i64>().map_err(|_| DurationError::Format(text.to_string()));
    let (h, m, s) = (parse(fields[0])?, parse(fields[1])?, parse(fields[2])?);
    if h > 23 || m > 59 || s > 59 {
        return Err(DurationError::Range(text.to_string()));
    }

    let span = Duration::hours(h) + Duration::minutes(m) + Duration::seconds(s);
    if span <= Duration::zero() {
        return Err(DurationError::NotPositive(text.to_string()));
    }
    Ok(span)
}

/// Long-form label for a span in whole minutes: `"2 hours"`, `"1 hour 5 mins"`, `"45 mins"`.
pub fn format_duration_label(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    let plural = |n: i64| if n == 1 { "" } else { "s" };

    if hours > 0 && mins > 0 {
        format!("{} hour{} {} min{}", hours, plural(hours), mins, plural(mins))
    } else if hours > 0 {
        format!("{} hour{}", hours, plural(hours))
    } else {
        format!("{} min{}", mins, plural(mins))
    }
}

/// Compact cumulative label: `"1h 5m"`, `"45m"`.
pub fn format_remaining(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
