// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator notification adapters

mod desktop;
mod notice;

pub use desktop::DesktopNotifyAdapter;
pub use notice::Notice;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifyAdapter;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from notify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Delivers operator notices somewhere a human will see them
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    async fn notify(&self, notice: &Notice) -> Result<(), NotifyError>;
}

/// Which adapter the daemon should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyMode {
    #[default]
    Desktop,
    None,
}

impl fmt::Display for NotifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyMode::Desktop => f.write_str("desktop"),
            NotifyMode::None => f.write_str("none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown notify mode {0:?} (expected desktop or none)")]
pub struct UnknownNotifyMode(pub String);

impl FromStr for NotifyMode {
    type Err = UnknownNotifyMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(NotifyMode::Desktop),
            "none" | "off" => Ok(NotifyMode::None),
            _ => Err(UnknownNotifyMode(s.to_string())),
        }
    }
}

/// Adapter chosen at startup from a [`NotifyMode`].
#[derive(Clone, Debug)]
pub enum Notifier {
    Desktop(DesktopNotifyAdapter),
    /// Notices are dropped; the event is still in the daemon log
    Disabled,
}

impl Notifier {
    pub fn for_mode(mode: NotifyMode) -> Self {
        match mode {
            NotifyMode::Desktop => Notifier::Desktop(DesktopNotifyAdapter::new()),
            NotifyMode::None => Notifier::Disabled,
        }
    }
}

#[async_trait]
impl NotifyAdapter for Notifier {
    async fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
        match self {
            Notifier::Desktop(adapter) => adapter.notify(notice).await,
            Notifier::Disabled => {
                tracing::trace!(title = %notice.title, "notice dropped");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
