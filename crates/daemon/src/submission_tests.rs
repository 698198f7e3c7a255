// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use vc_core::{Clock, ConnectionId, FakeClock, JobState, RequestId};
use yare::parameterized;

#[test]
fn parses_new_job() {
    let msg = ClientMessage::parse("NEW_JOB:7,J1,Render,01:30:00,2025-02-01\n").unwrap();
    assert_eq!(
        msg,
        ClientMessage::NewJob(NewJob {
            owner_id: 7,
            job_id: JobId::new("J1"),
            name: "Render".to_string(),
            duration: "01:30:00".to_string(),
            deadline: "2025-02-01".to_string(),
        })
    );
}

#[test]
fn parses_new_vehicle() {
    let msg =
        ClientMessage::parse("NEW_VEHICLE:fleet-a,3,Toyota,Prius,2020,V1,08:00:00\r\n").unwrap();
    let ClientMessage::NewVehicle(v) = msg else {
        panic!("expected vehicle, got {msg:?}");
    };
    assert_eq!(v.owner_text, "fleet-a");
    assert_eq!(v.vehicle_owner_id, 3);
    assert_eq!(v.vin, "V1");
    assert_eq!(v.residency_time, "08:00:00");
}

#[parameterized(
    too_few_job_fields = { "NEW_JOB:onlytwo,fields" },
    too_many_job_fields = { "NEW_JOB:1,J1,a,01:00:00,2025-01-01,extra" },
    short_vehicle = { "NEW_VEHICLE:a,1,Toyota" },
    unknown_prefix = { "DELETE_JOB:J1" },
    no_prefix = { "hello there" },
    empty = { "" },
    job_owner_not_numeric = { "NEW_JOB:ada,J1,a,01:00:00,2025-01-01" },
    vehicle_owner_not_numeric = { "NEW_VEHICLE:a,bob,Toyota,Prius,2020,V1,08:00:00" },
)]
fn rejects_malformed_lines(line: &str) {
    assert!(ClientMessage::parse(line).is_err(), "{line:?} should not parse");
}

#[test]
fn field_count_error_names_the_message() {
    let err = ClientMessage::parse("NEW_JOB:onlytwo,fields").unwrap_err();
    assert_eq!(
        err,
        WireError::FieldCount {
            prefix: "NEW_JOB",
            expected: 5,
            found: 2
        }
    );
}

#[test]
fn client_messages_render_as_wire_lines() {
    let line = "NEW_VEHICLE:fleet-a,3,Toyota,Prius,2020,V1,08:00:00";
    assert_eq!(ClientMessage::parse(line).unwrap().to_string(), line);
}

#[test]
fn job_submission_starts_pending_and_is_stamped() {
    let clock = FakeClock::new();
    let msg = ClientMessage::parse("NEW_JOB:7,J1,Render,01:30:00,2025-02-01").unwrap();

    let (payload, owner) = msg.into_submission(clock.now());

    assert_eq!(owner, Some(7));
    let Payload::Job(job) = payload else {
        panic!("expected job payload");
    };
    assert_eq!(job.status, JobState::PendingApproval);
    assert_eq!(job.created_at, clock.now());
}

#[test]
fn vehicle_submitter_is_the_vehicle_owner() {
    let msg = ClientMessage::parse("NEW_VEHICLE:fleet-a,3,Toyota,Prius,2020,V1,08:00:00").unwrap();
    let (payload, owner) = msg.into_submission(FakeClock::new().now());
    assert_eq!(owner, Some(3));
    assert_eq!(payload.subject(), Subject::Vehicle(Vin::new("V1")));
}

#[parameterized(
    vehicle_approved = { "APPROVAL_STATUS:V1,approved", Subject::Vehicle(Vin::new("V1")), Verdict::Approved },
    vehicle_rejected = { "APPROVAL_STATUS:V9,rejected", Subject::Vehicle(Vin::new("V9")), Verdict::Rejected },
    job_approved = { "JOB_APPROVAL_STATUS:J1,approved", Subject::Job(JobId::new("J1")), Verdict::Approved },
)]
fn parses_outcomes(line: &str, subject: Subject, verdict: Verdict) {
    let msg = ServerMessage::parse(line).unwrap();
    assert_eq!(msg.subject(), subject);
    assert_eq!(msg.verdict(), verdict);
    assert_eq!(msg.to_string(), line);
}

#[test]
fn unknown_verdict_is_an_error() {
    assert_eq!(
        ServerMessage::parse("APPROVAL_STATUS:V1,maybe"),
        Err(WireError::UnknownVerdict("maybe".to_string()))
    );
}

#[test]
fn outcome_lines_come_from_decision_events() {
    let approved = Event::RequestApproved {
        request_id: RequestId(1),
        subject: Subject::Vehicle(Vin::new("V1")),
        origin: Some(ConnectionId::new("conn-1")),
    };
    let rejected = Event::RequestRejected {
        request_id: RequestId(2),
        subject: Subject::Job(JobId::new("J2")),
        origin: None,
    };

    assert_eq!(
        ServerMessage::from_event(&approved).map(|m| m.to_string()),
        Some("APPROVAL_STATUS:V1,approved".to_string())
    );
    assert_eq!(
        ServerMessage::from_event(&rejected).map(|m| m.to_string()),
        Some("JOB_APPROVAL_STATUS:J2,rejected".to_string())
    );
}

#[test]
fn failures_and_bookkeeping_have_no_wire_form() {
    let failed = Event::ApprovalFailed {
        request_id: RequestId(1),
        subject: Subject::Job(JobId::new("J1")),
        error: "disk full".to_string(),
    };
    assert_eq!(ServerMessage::from_event(&failed), None);
    assert_eq!(ServerMessage::from_event(&Event::ScheduleUpdated { jobs: 2 }), None);
}

async fn read_all(bytes: &[u8]) -> Vec<Result<String, WireError>> {
    let mut reader = tokio::io::BufReader::new(bytes);
    let mut lines = Vec::new();
    while let Some(line) = read_line(&mut reader).await.unwrap() {
        lines.push(line);
    }
    lines
}

#[tokio::test]
async fn read_line_strips_terminators() {
    let lines = read_all(b"NEW_JOB:a\r\nlast-without-newline").await;
    assert_eq!(
        lines,
        vec![
            Ok("NEW_JOB:a".to_string()),
            Ok("last-without-newline".to_string())
        ]
    );
}

#[tokio::test]
async fn read_line_reports_bad_utf8_and_moves_on() {
    let lines = read_all(b"bad\xfe\xff\nok\n").await;
    assert_eq!(lines, vec![Err(WireError::InvalidUtf8), Ok("ok".to_string())]);
}

#[tokio::test]
async fn read_line_skips_the_rest_of_an_oversized_line() {
    let mut bytes = vec![b'x'; MAX_LINE_LEN * 3];
    bytes.extend_from_slice(b"\nnext\n");

    let lines = read_all(&bytes).await;

    assert_eq!(
        lines,
        vec![
            Err(WireError::LineTooLong { max: MAX_LINE_LEN }),
            Ok("next".to_string())
        ]
    );
}

#[tokio::test]
async fn read_line_accepts_a_line_at_the_limit() {
    let mut bytes = vec![b'x'; MAX_LINE_LEN];
    bytes.push(b'\n');

    let lines = read_all(&bytes).await;

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].as_ref().map(String::len), Ok(MAX_LINE_LEN));
}
