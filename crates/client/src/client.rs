// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection to the controller's submission server.
//!
//! One background task owns the connection: it connects, reads outcome
//! lines, and reconnects after a fixed delay whenever the connection fails
//! or drops. Everything it learns is posted onto a single notification
//! queue that the owner drains in order.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vc_core::Subject;
use vc_daemon::submission;
use vc_daemon::{ClientMessage, NewJob, NewVehicle, ServerMessage};

use crate::config::ClientConfig;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not connected to the controller")]
    NotConnected,

    #[error("send failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The connection task has stopped
    #[error("client closed")]
    Closed,
}

/// Something the connection task observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Connected,
    Disconnected,
    /// An operator decision, for this or any other submitter's request
    Outcome(ServerMessage),
    /// A line the client could not interpret
    Unrecognized(String),
}

type Writer = Arc<Mutex<Option<OwnedWriteHalf>>>;

/// Sends submissions and receives approval outcomes.
pub struct SubmissionClient {
    writer: Writer,
    notifications: mpsc::UnboundedReceiver<Notification>,
    task: JoinHandle<()>,
}

impl SubmissionClient {
    /// Start connecting in the background. Never fails; a missing server
    /// shows up as [`ClientError::NotConnected`] on send.
    pub fn start(config: ClientConfig) -> Self {
        let writer: Writer = Arc::new(Mutex::new(None));
        let (tx, notifications) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(config, Arc::clone(&writer), tx));
        Self {
            writer,
            notifications,
            task,
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.writer.lock().await.is_some()
    }

    /// Send one message. No acknowledgement is expected and a failed write
    /// is not retried.
    pub async fn send(&self, message: &ClientMessage) -> Result<(), ClientError> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(ClientError::NotConnected)?;
        let line = format!("{message}\n");
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            warn!(error = %e, "submission write failed");
            return Err(e.into());
        }
        debug!(line = line.trim_end(), "sent");
        Ok(())
    }

    pub async fn submit_job(&self, job: NewJob) -> Result<(), ClientError> {
        self.send(&ClientMessage::NewJob(job)).await
    }

    pub async fn register_vehicle(&self, vehicle: NewVehicle) -> Result<(), ClientError> {
        self.send(&ClientMessage::NewVehicle(vehicle)).await
    }

    /// Next notification, in the order the connection task produced them.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.notifications.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Notification> {
        self.notifications.try_recv().ok()
    }

    /// Wait until the client is connected, discarding notifications on the way.
    pub async fn wait_connected(&mut self, timeout: Duration) -> Result<(), ClientError> {
        if self.is_connected().await {
            return Ok(());
        }
        self.wait_for(timeout, |n| matches!(n, Notification::Connected).then_some(()))
            .await
    }

    /// Wait for the outcome concerning `subject`, discarding everything else.
    pub async fn wait_for_outcome(
        &mut self,
        subject: &Subject,
        timeout: Duration,
    ) -> Result<ServerMessage, ClientError> {
        self.wait_for(timeout, |n| match n {
            Notification::Outcome(msg) if msg.subject() == *subject => Some(msg),
            _ => None,
        })
        .await
    }

    async fn wait_for<T>(
        &mut self,
        timeout: Duration,
        mut pick: impl FnMut(Notification) -> Option<T>,
    ) -> Result<T, ClientError> {
        let found = tokio::time::timeout(timeout, async {
            while let Some(notification) = self.notifications.recv().await {
                if let Some(found) = pick(notification) {
                    return Ok(found);
                }
            }
            Err(ClientError::Closed)
        })
        .await;
        found.map_err(|_| ClientError::Timeout(timeout))?
    }
}

impl Drop for SubmissionClient {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Connection task: connect, read until the connection ends, wait, repeat.
async fn run(config: ClientConfig, writer: Writer, tx: mpsc::UnboundedSender<Notification>) {
    loop {
        match TcpStream::connect(&config.addr).await {
            Ok(stream) => {
                let (reader, write_half) = stream.into_split();
                *writer.lock().await = Some(write_half);
                info!(addr = %config.addr, "connected to controller");
                if tx.send(Notification::Connected).is_err() {
                    return;
                }

                read_outcomes(reader, &tx).await;

                *writer.lock().await = None;
                info!(addr = %config.addr, "disconnected from controller");
                if tx.send(Notification::Disconnected).is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!(
                    addr = %config.addr,
                    error = %e,
                    retry_in = ?config.retry_delay,
                    "controller unreachable"
                );
            }
        }
        tokio::time::sleep(config.retry_delay).await;
    }
}

async fn read_outcomes(reader: OwnedReadHalf, tx: &mpsc::UnboundedSender<Notification>) {
    let mut reader = BufReader::new(reader);
    loop {
        let line = match submission::read_line(&mut reader).await {
            Ok(Some(Ok(line))) => line,
            Ok(Some(Err(e))) => {
                warn!(error = %e, "dropping unreadable line from controller");
                continue;
            }
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "read from controller failed");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let notification = match ServerMessage::parse(&line) {
            Ok(message) => Notification::Outcome(message),
            Err(e) => {
                warn!(error = %e, "unrecognized line from controller");
                Notification::Unrecognized(line)
            }
        };
        if tx.send(notification).is_err() {
            return;
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
