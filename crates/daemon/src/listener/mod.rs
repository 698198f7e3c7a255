// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for the operator control socket.
//!
//! Each connection carries one request and one response. Handlers call
//! straight into the [`Controller`]; scheduling work is answered by the
//! engine task, approvals are only dispatched here.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};
use vc_engine::{ApprovalOutcome, Controller, Dispatch, EngineError};

use crate::protocol::{self, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};
use crate::server::ClientRegistry;

/// Listener task for accepting control connections.
pub struct Listener {
    socket: UnixListener,
    ctx: Arc<ListenCtx>,
}

/// What request handlers can reach.
pub struct ListenCtx {
    pub controller: Controller,
    /// Open submission connections, for status
    pub clients: ClientRegistry,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
}

impl Listener {
    pub fn new(socket: UnixListener, ctx: ListenCtx) -> Self {
        Self {
            socket,
            ctx: Arc::new(ctx),
        }
    }

    /// Run the listener loop, spawning a task per connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &ctx).await {
                            match e {
                                ConnectionError::Protocol(
                                    protocol::ProtocolError::ConnectionClosed,
                                ) => debug!("Client disconnected"),
                                ConnectionError::Protocol(protocol::ProtocolError::Timeout) => {
                                    warn!("Connection timeout")
                                }
                                _ => error!("Connection error: {}", e),
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, ctx: &ListenCtx) -> Result<(), ConnectionError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await?;

    // Read-only requests are polled often; keep them out of the info log
    if is_query(&request) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    let response = handle_request(request, ctx).await;
    debug!("Sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
    Ok(())
}

fn is_query(request: &Request) -> bool {
    matches!(
        request,
        Request::Ping
            | Request::Hello { .. }
            | Request::Status
            | Request::ListPending
            | Request::Schedule
            | Request::Summary
            | Request::JobStates
            | Request::Report
            | Request::DeadLetters
    )
}

/// Handle a single request and return a response.
pub async fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    let controller = &ctx.controller;
    let result = match request {
        Request::Ping => Ok(Response::Pong),

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "protocol version mismatch");
            }
            Ok(Response::Hello {
                version: PROTOCOL_VERSION.to_string(),
            })
        }

        Request::Status => Ok(Response::Status {
            uptime_secs: ctx.start_time.elapsed().as_secs(),
            pending: controller.pending_len(),
            connections: ctx.clients.len(),
            dead_letters: controller.dead_letters().len(),
        }),

        Request::ListPending => Ok(Response::Pending {
            requests: controller.list_pending(),
        }),

        Request::Approve { id } => {
            let on_done = move |outcome: &ApprovalOutcome| {
                debug!(
                    request_id = %outcome.request_id(),
                    approved = outcome.is_approved(),
                    "operator approval settled"
                );
            };
            controller.approve(id, on_done).map(|dispatch| match dispatch {
                Dispatch::Dispatched(id) => Response::Dispatched { id },
                Dispatch::NotFound(id) => Response::NotFound { id },
            })
        }

        Request::Reject { id } => Ok(if controller.reject(id) {
            Response::Rejected { id }
        } else {
            Response::NotFound { id }
        }),

        Request::Schedule => controller
            .load_schedule()
            .await
            .map(|schedule| Response::Schedule { schedule }),

        Request::Recompute => controller
            .calculate_completion_times()
            .await
            .map(|schedule| Response::Schedule { schedule }),

        Request::Advance => controller
            .advance_queue()
            .await
            .map(|advance| Response::Advanced {
                completed: advance.completed,
                started: advance.started,
            }),

        Request::AssignVehicles => controller
            .assign_vehicles_to_jobs()
            .await
            .map(|count| Response::Assigned { count }),

        Request::Summary => controller
            .queue_summary()
            .await
            .map(|summary| Response::Summary { summary }),

        Request::JobStates => controller
            .load_job_states()
            .await
            .map(|states| Response::JobStates { states }),

        Request::Report => controller
            .scheduling_report()
            .await
            .map(|rows| Response::Report { rows }),

        Request::DeadLetters => Ok(Response::DeadLetters {
            entries: controller.dead_letters(),
        }),

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Ok(Response::ShuttingDown)
        }
    };

    result.unwrap_or_else(|e: EngineError| {
        warn!(error = %e, "request failed");
        Response::Error {
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
#[path = "../listener_tests.rs"]
mod tests;
