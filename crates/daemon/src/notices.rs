// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Relays controller events to the operator's notifier.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use vc_adapters::{Notice, NotifyAdapter};
use vc_core::Event;

/// Spawn a task that turns events into operator notices.
///
/// Delivery failures are logged and never stop the relay.
pub fn spawn_notifier<N: NotifyAdapter>(
    events: broadcast::Receiver<Event>,
    notifier: N,
) -> JoinHandle<()> {
    tokio::spawn(relay(events, notifier))
}

async fn relay<N: NotifyAdapter>(mut events: broadcast::Receiver<Event>, notifier: N) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "notifier lagged behind controller events");
                continue;
            }
            Err(RecvError::Closed) => break,
        };
        let Some(notice) = Notice::for_event(&event) else {
            continue;
        };
        match notifier.notify(&notice).await {
            Ok(()) => debug!(event = event.name(), title = %notice.title, "operator notified"),
            Err(e) => warn!(event = event.name(), error = %e, "operator notification failed"),
        }
    }
}

#[cfg(test)]
#[path = "notices_tests.rs"]
mod tests;
