// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use vc_core::JobId;
use yare::parameterized;

fn render(table: &Table) -> String {
    let mut buf = Vec::new();
    table.render(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[parameterized(
    idle = { None, None, "Nothing to advance" },
    first_start = { None, Some("J1"), "Completed: -, started: J1" },
    handoff = { Some("J1"), Some("J2"), "Completed: J1, started: J2" },
    drained = { Some("J2"), None, "Completed: J2, started: -" },
)]
fn advance_is_described(completed: Option<&str>, started: Option<&str>, expected: &str) {
    let advance = Advance {
        completed: completed.map(JobId::new),
        started: started.map(JobId::new),
    };
    assert_eq!(describe_advance(&advance), expected);
}

#[test]
fn schedule_keeps_queue_order() {
    let mut schedule = Schedule::new();
    schedule.insert(JobId::new("J9"), "2025-01-01 10:00:00".to_string());
    schedule.insert(JobId::new("J1"), "2025-01-01 12:00:00".to_string());

    let out = render(&schedule_table(&schedule));
    let jobs: Vec<&str> = out
        .lines()
        .skip(1)
        .filter_map(|l| l.split_whitespace().next())
        .collect();

    assert_eq!(jobs, ["J9", "J1"]);
}

#[test]
fn states_are_sorted_by_job() {
    let mut states = JobStates::new();
    states.insert(JobId::new("J2"), JobState::Queued);
    states.insert(JobId::new("J1"), JobState::InProgress);

    let out = render(&states_table(&states));
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines, ["JOB  STATE", "J1   In Progress", "J2   Queued"]);
}

#[test]
fn summary_lists_every_state() {
    let summary = QueueSummary {
        pending_approval: 1,
        queued: 2,
        in_progress: 1,
        completed: 0,
    };

    let out = render(&summary_table(&summary));
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(
        lines,
        [
            "STATE             JOBS",
            "Pending Approval     1",
            "Queued               2",
            "In Progress          1",
            "Completed            0",
        ]
    );
}

#[test]
fn report_rows_show_state_label() {
    let row = ReportRow {
        job_id: JobId::new("J1"),
        duration: "01:00:00".to_string(),
        remaining: "01:00:00".to_string(),
        completion: "2025-01-01 10:00:00".to_string(),
        state: JobState::InProgress,
    };

    let out = render(&report_table(&[row]));

    assert!(out.lines().nth(1).unwrap().ends_with("In Progress"));
}
