// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events published by the controller.
//!
//! Serializes with `{"type": "request:approved", ...fields}` format.

use crate::id::RequestId;
use crate::job::JobId;
use crate::request::{ConnectionId, RequestKind, Subject};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A submission entered the pending queue and awaits the operator
    #[serde(rename = "request:submitted")]
    RequestSubmitted {
        request_id: RequestId,
        kind: RequestKind,
        subject: Subject,
        submitter: String,
    },

    /// An approved payload was persisted
    #[serde(rename = "request:approved")]
    RequestApproved {
        request_id: RequestId,
        subject: Subject,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<ConnectionId>,
    },

    #[serde(rename = "request:rejected")]
    RequestRejected {
        request_id: RequestId,
        subject: Subject,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<ConnectionId>,
    },

    /// An approved payload could not be persisted and was dead-lettered
    #[serde(rename = "request:failed")]
    ApprovalFailed {
        request_id: RequestId,
        subject: Subject,
        error: String,
    },

    /// The completion-time projection was recomputed
    #[serde(rename = "schedule:updated")]
    ScheduleUpdated { jobs: usize },

    #[serde(rename = "queue:advanced")]
    QueueAdvanced {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        completed: Option<JobId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        started: Option<JobId>,
    },

    #[serde(rename = "vehicles:assigned")]
    VehiclesAssigned { count: usize },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::RequestSubmitted { .. } => "request:submitted",
            Event::RequestApproved { .. } => "request:approved",
            Event::RequestRejected { .. } => "request:rejected",
            Event::ApprovalFailed { .. } => "request:failed",
            Event::ScheduleUpdated { .. } => "schedule:updated",
            Event::QueueAdvanced { .. } => "queue:advanced",
            Event::VehiclesAssigned { .. } => "vehicles:assigned",
        }
    }

    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Event::RequestSubmitted { request_id, .. }
            | Event::RequestApproved { request_id, .. }
            | Event::RequestRejected { request_id, .. }
            | Event::ApprovalFailed { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
