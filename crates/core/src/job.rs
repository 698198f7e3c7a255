// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compute jobs and their lifecycle states.

use crate::time_fmt::{self, DurationError};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

crate::string_id! {
    /// Submitter-chosen job identifier, unique within the store.
    pub struct JobId;
}

/// Lifecycle state of a job.
///
/// `PendingApproval` is the pre-state of a job still sitting in the approval
/// queue; the scheduler only ever sees the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    PendingApproval,
    Queued,
    InProgress,
    Completed,
}

impl JobState {
    pub const ALL: [JobState; 4] = [
        JobState::PendingApproval,
        JobState::Queued,
        JobState::InProgress,
        JobState::Completed,
    ];

    /// Human-facing label, also used as the summary key.
    pub fn label(self) -> &'static str {
        match self {
            JobState::PendingApproval => "Pending Approval",
            JobState::Queued => "Queued",
            JobState::InProgress => "In Progress",
            JobState::Completed => "Completed",
        }
    }

    /// True once the job has left the approval queue.
    pub fn is_schedulable(self) -> bool {
        !matches!(self, JobState::PendingApproval)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job state: {0:?}")]
pub struct UnknownJobState(pub String);

impl FromStr for JobState {
    type Err = UnknownJobState;

    /// Accepts both the label form (`"In Progress"`) and the snake_case form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "pending_approval" => Ok(JobState::PendingApproval),
            "queued" => Ok(JobState::Queued),
            "in_progress" => Ok(JobState::InProgress),
            "completed" => Ok(JobState::Completed),
            _ => Err(UnknownJobState(s.to_string())),
        }
    }
}

/// A unit of compute work with a duration and a deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub owner_id: u32,
    /// `HH:MM:SS` as submitted
    pub duration: String,
    /// `yyyy-MM-dd` as submitted
    pub deadline: String,
    pub status: JobState,
    pub created_at: NaiveDateTime,
}

impl Job {
    /// A freshly submitted job, pending approval.
    pub fn new(
        id: impl Into<JobId>,
        name: impl Into<String>,
        owner_id: u32,
        duration: impl Into<String>,
        deadline: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner_id,
            duration: duration.into(),
            deadline: deadline.into(),
            status: JobState::PendingApproval,
            created_at,
        }
    }

    pub fn with_status(mut self, status: JobState) -> Self {
        self.status = status;
        self
    }

    /// The submitted duration as a span, or why it could not be read.
    pub fn duration_span(&self) -> Result<Duration, DurationError> {
        time_fmt::parse_hms(&self.duration)
    }

    pub fn created_at_text(&self) -> String {
        time_fmt::format_timestamp(&self.created_at)
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
