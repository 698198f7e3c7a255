// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol for the operator control socket.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

use serde::{Deserialize, Serialize};
use vc_core::{JobId, PendingRequest, RequestId};
use vc_engine::{DeadLetter, QueueSummary, ReportRow};
use vc_storage::{JobStates, Schedule};

#[path = "protocol_wire.rs"]
mod wire;
pub use wire::{
    decode, encode, read_message, read_request, read_response, write_message, write_request,
    write_response, ProtocolError, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, PROTOCOL_VERSION,
};

/// Request from the operator CLI to the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Uptime and queue depth
    Status,

    /// Requests awaiting a decision, oldest first
    ListPending,

    /// Accept a pending request; persistence happens in the background
    Approve { id: RequestId },

    /// Discard a pending request
    Reject { id: RequestId },

    /// Last saved completion estimates
    Schedule,

    /// Recompute completion estimates now
    Recompute,

    /// Finish the running job and start the next queued one
    Advance,

    /// Put every registered vehicle to work on the earliest queued jobs
    AssignVehicles,

    Summary,

    JobStates,

    Report,

    /// Approved payloads that could not be saved
    DeadLetters,

    /// Request daemon shutdown
    Shutdown,
}

/// Response from the daemon to the operator CLI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Response {
    Pong,

    Hello { version: String },

    Status {
        uptime_secs: u64,
        pending: usize,
        connections: usize,
        dead_letters: usize,
    },

    Pending { requests: Vec<PendingRequest> },

    /// The approval was handed to a worker
    Dispatched { id: RequestId },

    Rejected { id: RequestId },

    /// The request was already approved, rejected, or never existed
    NotFound { id: RequestId },

    Schedule { schedule: Schedule },

    Advanced {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        completed: Option<JobId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        started: Option<JobId>,
    },

    Assigned { count: usize },

    Summary { summary: QueueSummary },

    JobStates { states: JobStates },

    Report { rows: Vec<ReportRow> },

    DeadLetters { entries: Vec<DeadLetter> },

    ShuttingDown,

    Error { message: String },
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
