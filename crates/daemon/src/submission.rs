// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line protocol spoken between submitters and the controller.
//!
//! Each message is one newline-terminated UTF-8 line of the form
//! `PREFIX:field,field,...`. Submitters send `NEW_JOB` and `NEW_VEHICLE`;
//! the controller answers asynchronously with `JOB_APPROVAL_STATUS` and
//! `APPROVAL_STATUS` once an operator has decided.

use std::fmt;
use std::io;
use std::str::FromStr;

use chrono::NaiveDateTime;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use vc_core::{Event, Job, JobId, Payload, Subject, VehicleRegistration, Vin};

/// Default TCP port for the submission protocol
pub const DEFAULT_PORT: u16 = 9876;

/// Longest line either side reads; the rest of a longer line is skipped
pub const MAX_LINE_LEN: usize = 8 * 1024;

const NEW_JOB: &str = "NEW_JOB";
const NEW_VEHICLE: &str = "NEW_VEHICLE";
const APPROVAL_STATUS: &str = "APPROVAL_STATUS";
const JOB_APPROVAL_STATUS: &str = "JOB_APPROVAL_STATUS";

/// A line that could not be understood
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("unrecognized message {0:?}")]
    UnknownPrefix(String),

    #[error("{prefix} expects {expected} fields, got {found}")]
    FieldCount {
        prefix: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("unrecognized verdict {0:?}")]
    UnknownVerdict(String),

    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    #[error("line exceeds {max} bytes")]
    LineTooLong { max: usize },
}

/// `NEW_JOB:<ownerId>,<jobId>,<jobName>,<duration>,<deadline>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub owner_id: u32,
    pub job_id: JobId,
    pub name: String,
    pub duration: String,
    pub deadline: String,
}

/// `NEW_VEHICLE:<ownerText>,<vehicleOwnerId>,<make>,<model>,<year>,<vin>,<residency>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVehicle {
    pub owner_text: String,
    pub vehicle_owner_id: u32,
    pub make: String,
    pub model: String,
    pub year: String,
    pub vin: Vin,
    pub residency_time: String,
}

/// Submitter to controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    NewJob(NewJob),
    NewVehicle(NewVehicle),
}

impl ClientMessage {
    /// Parse one line, with or without its trailing newline.
    pub fn parse(line: &str) -> Result<Self, WireError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (prefix, body) = split_prefix(line)?;
        match prefix {
            NEW_JOB => {
                let [owner, job_id, name, duration, deadline] = fields::<5>(NEW_JOB, body)?;
                Ok(ClientMessage::NewJob(NewJob {
                    owner_id: number("ownerId", owner)?,
                    job_id: JobId::new(job_id),
                    name: name.to_string(),
                    duration: duration.to_string(),
                    deadline: deadline.to_string(),
                }))
            }
            NEW_VEHICLE => {
                let [owner_text, vehicle_owner, make, model, year, vin, residency] =
                    fields::<7>(NEW_VEHICLE, body)?;
                Ok(ClientMessage::NewVehicle(NewVehicle {
                    owner_text: owner_text.to_string(),
                    vehicle_owner_id: number("vehicleOwnerId", vehicle_owner)?,
                    make: make.to_string(),
                    model: model.to_string(),
                    year: year.to_string(),
                    vin: Vin::new(vin),
                    residency_time: residency.to_string(),
                }))
            }
            _ => Err(WireError::UnknownPrefix(line.to_string())),
        }
    }

    /// Build the pending payload, stamped with `now`.
    ///
    /// Also returns the user id used to describe the submitter.
    pub fn into_submission(self, now: NaiveDateTime) -> (Payload, Option<u32>) {
        match self {
            ClientMessage::NewJob(job) => {
                let owner = job.owner_id;
                let payload = Payload::Job(Job::new(
                    job.job_id,
                    job.name,
                    job.owner_id,
                    job.duration,
                    job.deadline,
                    now,
                ));
                (payload, Some(owner))
            }
            ClientMessage::NewVehicle(v) => {
                let owner = v.vehicle_owner_id;
                let payload = Payload::Vehicle(VehicleRegistration {
                    owner_id: v.owner_text,
                    vehicle_owner_id: v.vehicle_owner_id,
                    make: v.make,
                    model: v.model,
                    year: v.year,
                    vin: v.vin,
                    residency_time: v.residency_time,
                    registered_at: now,
                });
                (payload, Some(owner))
            }
        }
    }
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMessage::NewJob(j) => write!(
                f,
                "{NEW_JOB}:{},{},{},{},{}",
                j.owner_id, j.job_id, j.name, j.duration, j.deadline
            ),
            ClientMessage::NewVehicle(v) => write!(
                f,
                "{NEW_VEHICLE}:{},{},{},{},{},{},{}",
                v.owner_text, v.vehicle_owner_id, v.make, v.model, v.year, v.vin, v.residency_time
            ),
        }
    }
}

/// The operator's decision on a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Rejected,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Approved => f.write_str("approved"),
            Verdict::Rejected => f.write_str("rejected"),
        }
    }
}

impl FromStr for Verdict {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Verdict::Approved),
            "rejected" => Ok(Verdict::Rejected),
            other => Err(WireError::UnknownVerdict(other.to_string())),
        }
    }
}

/// Controller to submitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    ApprovalStatus { vin: Vin, verdict: Verdict },
    JobApprovalStatus { job_id: JobId, verdict: Verdict },
}

impl ServerMessage {
    pub fn new(subject: Subject, verdict: Verdict) -> Self {
        match subject {
            Subject::Job(job_id) => ServerMessage::JobApprovalStatus { job_id, verdict },
            Subject::Vehicle(vin) => ServerMessage::ApprovalStatus { vin, verdict },
        }
    }

    /// The outcome line for a controller event, if it carries one.
    ///
    /// Persistence failures have no wire representation.
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::RequestApproved { subject, .. } => {
                Some(Self::new(subject.clone(), Verdict::Approved))
            }
            Event::RequestRejected { subject, .. } => {
                Some(Self::new(subject.clone(), Verdict::Rejected))
            }
            _ => None,
        }
    }

    pub fn parse(line: &str) -> Result<Self, WireError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (prefix, body) = split_prefix(line)?;
        match prefix {
            APPROVAL_STATUS => {
                let [vin, verdict] = fields::<2>(APPROVAL_STATUS, body)?;
                Ok(ServerMessage::ApprovalStatus {
                    vin: Vin::new(vin),
                    verdict: verdict.parse()?,
                })
            }
            JOB_APPROVAL_STATUS => {
                let [job_id, verdict] = fields::<2>(JOB_APPROVAL_STATUS, body)?;
                Ok(ServerMessage::JobApprovalStatus {
                    job_id: JobId::new(job_id),
                    verdict: verdict.parse()?,
                })
            }
            _ => Err(WireError::UnknownPrefix(line.to_string())),
        }
    }

    pub fn subject(&self) -> Subject {
        match self {
            ServerMessage::ApprovalStatus { vin, .. } => Subject::Vehicle(vin.clone()),
            ServerMessage::JobApprovalStatus { job_id, .. } => Subject::Job(job_id.clone()),
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self {
            ServerMessage::ApprovalStatus { verdict, .. }
            | ServerMessage::JobApprovalStatus { verdict, .. } => *verdict,
        }
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::ApprovalStatus { vin, verdict } => {
                write!(f, "{APPROVAL_STATUS}:{vin},{verdict}")
            }
            ServerMessage::JobApprovalStatus { job_id, verdict } => {
                write!(f, "{JOB_APPROVAL_STATUS}:{job_id},{verdict}")
            }
        }
    }
}

/// Read the next line, without its terminator.
///
/// `Ok(None)` is end of stream. An oversized or non-UTF-8 line is consumed
/// through its newline and comes back as `Some(Err(_))`, leaving the stream
/// positioned at the next line.
pub async fn read_line<R>(reader: &mut R) -> io::Result<Option<Result<String, WireError>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let read = (&mut *reader)
        .take(MAX_LINE_LEN as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > MAX_LINE_LEN {
        skip_line(reader).await?;
        return Ok(Some(Err(WireError::LineTooLong { max: MAX_LINE_LEN })));
    }

    Ok(Some(String::from_utf8(buf).map_err(|_| WireError::InvalidUtf8)))
}

async fn skip_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<()> {
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|b| *b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

fn split_prefix(line: &str) -> Result<(&str, &str), WireError> {
    line.split_once(':')
        .ok_or_else(|| WireError::UnknownPrefix(line.to_string()))
}

fn fields<'a, const N: usize>(
    prefix: &'static str,
    body: &'a str,
) -> Result<[&'a str; N], WireError> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let found = parts.len();
    parts.try_into().map_err(|_| WireError::FieldCount {
        prefix,
        expected: N,
        found,
    })
}

fn number(field: &'static str, value: &str) -> Result<u32, WireError> {
    value.parse().map_err(|_| WireError::NotANumber {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
#[path = "submission_tests.rs"]
mod tests;
