// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Approval-gated submissions awaiting an operator decision.

use crate::id::RequestId;
use crate::job::{Job, JobId};
use crate::vehicle::{VehicleRegistration, Vin};
use serde::{Deserialize, Serialize};
use std::fmt;

crate::string_id! {
    /// Identifies one accepted submission connection.
    pub struct ConnectionId;
}

/// What kind of payload a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Job,
    Vehicle,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Job => write!(f, "job"),
            RequestKind::Vehicle => write!(f, "vehicle"),
        }
    }
}

/// The submission itself. A request owns exactly one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Job(Job),
    Vehicle(VehicleRegistration),
}

impl Payload {
    pub fn kind(&self) -> RequestKind {
        match self {
            Payload::Job(_) => RequestKind::Job,
            Payload::Vehicle(_) => RequestKind::Vehicle,
        }
    }

    pub fn subject(&self) -> Subject {
        match self {
            Payload::Job(job) => Subject::Job(job.id.clone()),
            Payload::Vehicle(vehicle) => Subject::Vehicle(vehicle.vin.clone()),
        }
    }
}

/// The natural key a submitter uses to recognise its submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Subject {
    Job(JobId),
    Vehicle(Vin),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Job(id) => write!(f, "job {}", id),
            Subject::Vehicle(vin) => write!(f, "vehicle {}", vin),
        }
    }
}

/// A submission waiting in the pending queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub id: RequestId,
    pub payload: Payload,
    /// Free text describing who submitted the request
    pub submitter: String,
    /// Connection the submission arrived on, if it came over the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<ConnectionId>,
}

impl PendingRequest {
    pub fn new(id: RequestId, payload: Payload, submitter: impl Into<String>) -> Self {
        Self {
            id,
            payload,
            submitter: submitter.into(),
            origin: None,
        }
    }

    /// Rebuild a request read back from a durable mirror, id included.
    pub fn restore(
        id: RequestId,
        payload: Payload,
        submitter: impl Into<String>,
        origin: Option<ConnectionId>,
    ) -> Self {
        Self::new(id, payload, submitter).with_origin(origin)
    }

    pub fn with_origin(mut self, origin: Option<ConnectionId>) -> Self {
        self.origin = origin;
        self
    }

    pub fn kind(&self) -> RequestKind {
        self.payload.kind()
    }

    pub fn subject(&self) -> Subject {
        self.payload.subject()
    }

    /// One-line description for operator listings.
    pub fn details(&self) -> String {
        match &self.payload {
            Payload::Job(job) => format!("Job ID: {}, Name: {}", job.id, job.name),
            Payload::Vehicle(v) => {
                format!("VIN: {}, Make: {}, Model: {}", v.vin, v.make, v.model)
            }
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
