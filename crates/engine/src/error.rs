// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use thiserror::Error;
use vc_storage::StoreError;

/// Errors from schedule computation
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors surfaced through the [`Controller`](crate::Controller) handle
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("engine task has stopped")]
    Stopped,
}
