// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

use crate::lifecycle::LifecycleError;

pub const STATE_DIR: &str = "VC_STATE_DIR";
pub const BIND: &str = "VC_BIND";
pub const PORT: &str = "VC_PORT";
pub const MAX_CONNECTIONS: &str = "VC_MAX_CONNECTIONS";
pub const MAX_APPROVAL_WORKERS: &str = "VC_MAX_APPROVAL_WORKERS";
pub const OUTCOME_SCOPE: &str = "VC_OUTCOME_SCOPE";
pub const NOTIFY: &str = "VC_NOTIFY";

/// Resolve state directory: VC_STATE_DIR > XDG_STATE_HOME/vc > ~/.local/state/vc
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Some(dir) = var(STATE_DIR) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("vc"));
    }
    let home = var("HOME").ok_or(LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/vc"))
}

/// A set, non-empty variable
pub fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
