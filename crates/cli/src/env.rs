// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable access for the CLI crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::client::ClientError;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Control socket of the running daemon, under its state directory.
pub fn daemon_socket() -> Result<PathBuf, ClientError> {
    let dir = vc_daemon::env::state_dir().map_err(|_| ClientError::NoStateDir)?;
    Ok(dir.join("daemon.sock"))
}

/// Timeout for one control-socket round trip
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("VC_TIMEOUT_IPC_MS").unwrap_or(vc_daemon::DEFAULT_TIMEOUT)
}

/// How long `submit --wait` waits for an operator decision
pub fn timeout_decision() -> Duration {
    parse_duration_ms("VC_TIMEOUT_DECISION_MS").unwrap_or(Duration::from_secs(300))
}
