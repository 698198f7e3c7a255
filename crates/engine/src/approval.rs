// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator decisions on pending requests.
//!
//! Removal from the [`PendingQueue`] is the only synchronization point: of
//! two racing decisions on one id, exactly one gets the request and the other
//! sees "not found". Persistence of an approved payload is handed to the
//! engine task and never runs on the approving caller's path.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use vc_core::{Event, JobState, Payload, PendingRequest, RequestId, Subject};
use vc_storage::{Store, StoreError};

use crate::controller::Command;
use crate::error::EngineError;
use crate::event_bus::EventBus;
use crate::pending::PendingQueue;

/// Callback run on the engine task once an approval has fully settled.
pub type OnDone = Box<dyn FnOnce(&ApprovalOutcome) + Send + 'static>;

/// Immediate answer to an approve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "id", rename_all = "snake_case")]
pub enum Dispatch {
    /// Removed from the queue; persistence is under way
    Dispatched(RequestId),
    /// Never issued or already handled
    NotFound(RequestId),
}

/// Final result of an approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApprovalOutcome {
    Approved {
        request_id: RequestId,
        subject: Subject,
    },
    Failed {
        request_id: RequestId,
        subject: Subject,
        error: String,
    },
}

impl ApprovalOutcome {
    pub fn request_id(&self) -> RequestId {
        match self {
            ApprovalOutcome::Approved { request_id, .. }
            | ApprovalOutcome::Failed { request_id, .. } => *request_id,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, ApprovalOutcome::Approved { .. })
    }
}

/// An approved request whose payload could not be persisted.
///
/// Kept for the operator to inspect; it is not re-queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadLetter {
    pub request: PendingRequest,
    pub error: String,
    pub failed_at: NaiveDateTime,
}

/// Accept/decline front door over the pending queue.
#[derive(Clone)]
pub struct ApprovalWorkflow {
    queue: Arc<PendingQueue>,
    commands: mpsc::UnboundedSender<Command>,
    events: EventBus,
}

impl ApprovalWorkflow {
    pub(crate) fn new(
        queue: Arc<PendingQueue>,
        commands: mpsc::UnboundedSender<Command>,
        events: EventBus,
    ) -> Self {
        Self {
            queue,
            commands,
            events,
        }
    }

    /// Take the request and hand its payload to the engine for persistence.
    ///
    /// Returns as soon as the request has left the queue. `on_done` runs on
    /// the engine task after the outcome is known, whatever it is.
    pub fn approve(&self, id: RequestId, on_done: OnDone) -> Result<Dispatch, EngineError> {
        let Some(request) = self.queue.remove_by_id(id) else {
            warn!(request_id = %id, "approve: request not found or already handled");
            return Ok(Dispatch::NotFound(id));
        };
        info!(request_id = %id, subject = %request.subject(), "request approved, persisting");

        let command = Command::Persist {
            request,
            on_done: Some(on_done),
        };
        if let Err(mpsc::error::SendError(command)) = self.commands.send(command) {
            // Engine gone: report the loss through the usual failure path.
            if let Command::Persist {
                request,
                on_done: Some(on_done),
            } = command
            {
                warn!(request_id = %id, "engine stopped, approved payload dropped");
                on_done(&ApprovalOutcome::Failed {
                    request_id: id,
                    subject: request.subject(),
                    error: EngineError::Stopped.to_string(),
                });
            }
            return Err(EngineError::Stopped);
        }
        let _ = self.commands.send(Command::MirrorPending);
        Ok(Dispatch::Dispatched(id))
    }

    /// Discard a request without persisting anything.
    pub fn reject(&self, id: RequestId) -> bool {
        let Some(request) = self.queue.remove_by_id(id) else {
            warn!(request_id = %id, "reject: request not found or already handled");
            return false;
        };
        info!(request_id = %id, subject = %request.subject(), "request rejected");
        self.events.send(Event::RequestRejected {
            request_id: id,
            subject: request.subject(),
            origin: request.origin.clone(),
        });
        let _ = self.commands.send(Command::MirrorPending);
        true
    }
}

/// Write an approved payload to the store in its post-approval form.
pub(crate) fn persist<S: Store + ?Sized>(store: &S, payload: &Payload) -> Result<(), StoreError> {
    match payload {
        Payload::Job(job) => store.add_job(&job.clone().with_status(JobState::Queued)),
        Payload::Vehicle(vehicle) => store.add_vehicle(vehicle),
    }
}

#[cfg(test)]
#[path = "approval_tests.rs"]
mod tests;
