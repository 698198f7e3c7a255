// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::vehicle::Vin;

#[test]
fn event_serializes_with_type_tag() {
    let event = Event::RequestApproved {
        request_id: RequestId(3),
        subject: Subject::Vehicle(Vin::new("V1")),
        origin: None,
    };
    let json: serde_json::Value = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "request:approved");
    assert_eq!(json["request_id"], 3);
    assert_eq!(json["subject"]["kind"], "vehicle");
    assert_eq!(json["subject"]["id"], "V1");
    assert!(json.get("origin").is_none());
}

#[test]
fn event_name_matches_serialized_tag() {
    let events = vec![
        Event::ScheduleUpdated { jobs: 2 },
        Event::QueueAdvanced {
            completed: Some(JobId::new("J1")),
            started: None,
        },
        Event::VehiclesAssigned { count: 1 },
        Event::ApprovalFailed {
            request_id: RequestId(1),
            subject: Subject::Job(JobId::new("J1")),
            error: "disk full".to_string(),
        },
    ];
    for event in events {
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
    }
}

#[test]
fn request_id_only_on_request_events() {
    let submitted = Event::RequestSubmitted {
        request_id: RequestId(9),
        kind: RequestKind::Job,
        subject: Subject::Job(JobId::new("J1")),
        submitter: "Unknown".to_string(),
    };
    assert_eq!(submitted.request_id(), Some(RequestId(9)));
    assert_eq!(Event::ScheduleUpdated { jobs: 0 }.request_id(), None);
}
