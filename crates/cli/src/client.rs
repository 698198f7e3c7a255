// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-socket client for operator commands

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::net::UnixStream;
use vc_core::{PendingRequest, RequestId};
use vc_daemon::protocol::{self, ProtocolError};
use vc_daemon::{Request, Response, PROTOCOL_VERSION};
use vc_engine::{Advance, DeadLetter, QueueSummary, ReportRow};
use vc_storage::{JobStates, Schedule};

use crate::env::{daemon_socket, timeout_ipc};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine state directory")]
    NoStateDir,
}

/// Daemon health as reported by `Request::Status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaemonStatus {
    pub uptime_secs: u64,
    pub pending: usize,
    pub connections: usize,
    pub dead_letters: usize,
}

/// Whether an approve or reject found its request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decided {
    Yes(RequestId),
    NotFound(RequestId),
}

pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    /// Connect to the running daemon (never starts one)
    pub fn connect() -> Result<Self, ClientError> {
        let socket_path = daemon_socket()?;
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self::at(socket_path))
    }

    pub fn at(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout: timeout_ipc(),
        }
    }

    /// One request per connection, one response back.
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = match UnixStream::connect(&self.socket_path).await {
            Ok(stream) => stream,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused
                ) =>
            {
                return Err(ClientError::DaemonNotRunning)
            }
            Err(e) => return Err(e.into()),
        };
        let (mut reader, mut writer) = stream.into_split();
        protocol::write_request(&mut writer, request, self.timeout).await?;
        let response = protocol::read_response(&mut reader, self.timeout).await?;
        match response {
            Response::Error { message } => Err(ClientError::Rejected(message)),
            other => Ok(other),
        }
    }

    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello {
            version: PROTOCOL_VERSION.to_string(),
        };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn status(&self) -> Result<DaemonStatus, ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status {
                uptime_secs,
                pending,
                connections,
                dead_letters,
            } => Ok(DaemonStatus {
                uptime_secs,
                pending,
                connections,
                dead_letters,
            }),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn list_pending(&self) -> Result<Vec<PendingRequest>, ClientError> {
        match self.send(&Request::ListPending).await? {
            Response::Pending { requests } => Ok(requests),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn approve(&self, id: RequestId) -> Result<Decided, ClientError> {
        match self.send(&Request::Approve { id }).await? {
            Response::Dispatched { id } => Ok(Decided::Yes(id)),
            Response::NotFound { id } => Ok(Decided::NotFound(id)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn reject(&self, id: RequestId) -> Result<Decided, ClientError> {
        match self.send(&Request::Reject { id }).await? {
            Response::Rejected { id } => Ok(Decided::Yes(id)),
            Response::NotFound { id } => Ok(Decided::NotFound(id)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn schedule(&self) -> Result<Schedule, ClientError> {
        self.fetch_schedule(Request::Schedule).await
    }

    pub async fn recompute(&self) -> Result<Schedule, ClientError> {
        self.fetch_schedule(Request::Recompute).await
    }

    async fn fetch_schedule(&self, request: Request) -> Result<Schedule, ClientError> {
        match self.send(&request).await? {
            Response::Schedule { schedule } => Ok(schedule),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn advance(&self) -> Result<Advance, ClientError> {
        match self.send(&Request::Advance).await? {
            Response::Advanced { completed, started } => Ok(Advance { completed, started }),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn assign_vehicles(&self) -> Result<usize, ClientError> {
        match self.send(&Request::AssignVehicles).await? {
            Response::Assigned { count } => Ok(count),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn summary(&self) -> Result<QueueSummary, ClientError> {
        match self.send(&Request::Summary).await? {
            Response::Summary { summary } => Ok(summary),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn job_states(&self) -> Result<JobStates, ClientError> {
        match self.send(&Request::JobStates).await? {
            Response::JobStates { states } => Ok(states),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn report(&self) -> Result<Vec<ReportRow>, ClientError> {
        match self.send(&Request::Report).await? {
            Response::Report { rows } => Ok(rows),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn dead_letters(&self) -> Result<Vec<DeadLetter>, ClientError> {
        match self.send(&Request::DeadLetters).await? {
            Response::DeadLetters { entries } => Ok(entries),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::ShuttingDown => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
