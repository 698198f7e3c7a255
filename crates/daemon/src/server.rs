// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submission server: the TCP side of the line protocol.
//!
//! Every accepted connection gets its own read task plus a writer task fed
//! by an unbounded channel. The writer channels live in a [`ClientRegistry`]
//! so approval outcomes can be pushed to open connections at any time.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tracing::{debug, error, info, warn};
use vc_core::{Clock, ConnectionId, Event};
use vc_engine::Controller;

use crate::submission::{self, ClientMessage, ServerMessage};

/// Which connections hear about an approval outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeScope {
    /// Every open connection, whoever submitted the request
    #[default]
    All,
    /// Only the connection the request arrived on, while it is still open
    Submitter,
}

impl fmt::Display for OutcomeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeScope::All => f.write_str("all"),
            OutcomeScope::Submitter => f.write_str("submitter"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown outcome scope {0:?} (expected all or submitter)")]
pub struct UnknownOutcomeScope(pub String);

impl FromStr for OutcomeScope {
    type Err = UnknownOutcomeScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(OutcomeScope::All),
            "submitter" => Ok(OutcomeScope::Submitter),
            _ => Err(UnknownOutcomeScope(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Connections beyond this many are closed as soon as they are accepted
    pub max_connections: usize,
    pub outcome_scope: OutcomeScope,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_connections: 64,
            outcome_scope: OutcomeScope::All,
        }
    }
}

/// Open connections, keyed by id, with the channel feeding each writer.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: Arc<Mutex<HashMap<ConnectionId, mpsc::UnboundedSender<String>>>>,
}

impl ClientRegistry {
    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }

    fn insert(&self, id: ConnectionId, tx: mpsc::UnboundedSender<String>) {
        self.clients.lock().insert(id, tx);
    }

    fn remove(&self, id: &ConnectionId) {
        self.clients.lock().remove(id);
    }

    /// Queue `line` on every open connection. Returns how many took it.
    ///
    /// Connections whose writer has gone away are pruned.
    pub fn broadcast(&self, line: &str) -> usize {
        let mut clients = self.clients.lock();
        clients.retain(|id, tx| {
            let open = tx.send(line.to_string()).is_ok();
            if !open {
                debug!(conn = %id, "pruning closed connection");
            }
            open
        });
        clients.len()
    }

    /// Queue `line` on one connection only.
    pub fn send_to(&self, id: &ConnectionId, line: &str) -> bool {
        let mut clients = self.clients.lock();
        let Some(tx) = clients.get(id) else {
            return false;
        };
        if tx.send(line.to_string()).is_ok() {
            return true;
        }
        clients.remove(id);
        false
    }
}

/// Accepts submitter connections and relays approval outcomes to them.
pub struct ProtocolServer<C: Clock> {
    listener: TcpListener,
    controller: Controller,
    clock: C,
    config: ServerConfig,
    clients: ClientRegistry,
    permits: Arc<Semaphore>,
}

impl<C: Clock> ProtocolServer<C> {
    pub fn new(listener: TcpListener, controller: Controller, clock: C, config: ServerConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_connections));
        Self {
            listener,
            controller,
            clock,
            config,
            clients: ClientRegistry::default(),
            permits,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle on the open connections, usable after [`run`](Self::run) takes the server.
    pub fn clients(&self) -> ClientRegistry {
        self.clients.clone()
    }

    /// Accept connections until the task is dropped.
    pub async fn run(self) {
        let outcomes = self.controller.events().subscribe();
        tokio::spawn(forward_outcomes(
            outcomes,
            self.clients.clone(),
            self.config.outcome_scope,
        ));

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
                        warn!(%peer, max = self.config.max_connections, "connection limit reached, closing");
                        drop(stream);
                        continue;
                    };
                    let conn = Connection {
                        id: ConnectionId::new(uuid::Uuid::new_v4().to_string()),
                        peer,
                        controller: self.controller.clone(),
                        clock: self.clock.clone(),
                        clients: self.clients.clone(),
                    };
                    tokio::spawn(async move {
                        conn.serve(stream).await;
                        drop(permit);
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

struct Connection<C: Clock> {
    id: ConnectionId,
    peer: SocketAddr,
    controller: Controller,
    clock: C,
    clients: ClientRegistry,
}

impl<C: Clock> Connection<C> {
    async fn serve(self, stream: TcpStream) {
        let (reader, mut writer) = stream.into_split();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        self.clients.insert(self.id.clone(), tx);
        info!(conn = %self.id, peer = %self.peer, "submitter connected");

        let conn = self.id.clone();
        tokio::spawn(async move {
            while let Some(mut line) = rx.recv().await {
                line.push('\n');
                if let Err(e) = writer.write_all(line.as_bytes()).await {
                    debug!(%conn, error = %e, "write failed, closing writer");
                    break;
                }
            }
        });

        let mut reader = BufReader::new(reader);
        loop {
            match submission::read_line(&mut reader).await {
                Ok(Some(Ok(line))) => self.handle_line(&line),
                Ok(Some(Err(e))) => {
                    warn!(conn = %self.id, error = %e, "dropping malformed message")
                }
                Ok(None) => {
                    info!(conn = %self.id, peer = %self.peer, "submitter disconnected");
                    break;
                }
                Err(e) => {
                    warn!(conn = %self.id, peer = %self.peer, error = %e, "read failed, dropping connection");
                    break;
                }
            }
        }

        // Dropping the registry's sender ends the writer task
        self.clients.remove(&self.id);
    }

    fn handle_line(&self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        debug!(conn = %self.id, line, "received");
        match ClientMessage::parse(line) {
            Ok(message) => {
                let (payload, owner) = message.into_submission(self.clock.now());
                self.controller
                    .submit_for_approval(payload, owner, Some(self.id.clone()));
            }
            Err(e) => warn!(conn = %self.id, error = %e, "dropping malformed message"),
        }
    }
}

/// Turn decision events into outcome lines for the right connections.
async fn forward_outcomes(
    mut events: broadcast::Receiver<Event>,
    clients: ClientRegistry,
    scope: OutcomeScope,
) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "outcome forwarder lagged, some outcomes were not sent");
                continue;
            }
            Err(RecvError::Closed) => break,
        };
        let Some(message) = ServerMessage::from_event(&event) else {
            continue;
        };
        let line = message.to_string();
        let delivered = match (scope, origin(&event)) {
            (OutcomeScope::All, _) => clients.broadcast(&line),
            (OutcomeScope::Submitter, Some(conn)) => usize::from(clients.send_to(conn, &line)),
            (OutcomeScope::Submitter, None) => 0,
        };
        debug!(request_id = ?event.request_id(), line = %line, delivered, "outcome sent");
    }
}

fn origin(event: &Event) -> Option<&ConnectionId> {
    match event {
        Event::RequestApproved { origin, .. } | Event::RequestRejected { origin, .. } => {
            origin.as_ref()
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
