// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus for controller observers.
//!
//! Every observer (the submission server's outcome forwarder, operator
//! notifications, tests) gets its own receiver. Slow observers lag and lose
//! the oldest events rather than blocking the engine.

use tokio::sync::broadcast;
use tracing::debug;
use vc_core::Event;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish to every current subscriber.
    ///
    /// Returns the number of receivers the event reached; zero is not an error.
    pub fn send(&self, event: Event) -> usize {
        debug!(event = event.name(), "publish");
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
