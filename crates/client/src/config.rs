// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use vc_daemon::DEFAULT_PORT;

pub const ADDR_VAR: &str = "VC_ADDR";
pub const RETRY_MS_VAR: &str = "VC_RETRY_MS";

/// Delay before another connection attempt
pub const DEFAULT_RETRY: Duration = Duration::from_millis(5000);

/// Where to find the controller and how patiently to reconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `host:port` of the submission server
    pub addr: String,
    pub retry_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: format!("127.0.0.1:{DEFAULT_PORT}"),
            retry_delay: DEFAULT_RETRY,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `VC_ADDR` and `VC_RETRY_MS`.
    ///
    /// An unparseable retry delay keeps the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(addr) = var(ADDR_VAR) {
            config.addr = addr;
        }
        if let Some(ms) = var(RETRY_MS_VAR).and_then(|s| s.parse::<u64>().ok()) {
            config.retry_delay = Duration::from_millis(ms);
        }
        config
    }

    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
