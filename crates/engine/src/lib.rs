// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Vehicular cloud controller engine: approval gate and FIFO scheduler

mod approval;
mod controller;
mod error;
mod event_bus;
mod pending;
mod scheduler;

pub use approval::{ApprovalOutcome, ApprovalWorkflow, DeadLetter, Dispatch, OnDone};
pub use controller::{Controller, ControllerConfig, Engine};
pub use error::{EngineError, SchedulerError};
pub use event_bus::EventBus;
pub use pending::PendingQueue;
pub use scheduler::{Advance, QueueSummary, ReportRow, Scheduler};
