// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vc-core: data model for the vehicular cloud controller

pub mod clock;
pub mod event;
pub mod id;
pub mod job;
pub mod request;
pub mod time_fmt;
pub mod user;
pub mod vehicle;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
pub use event::Event;
pub use id::RequestId;
pub use job::{Job, JobId, JobState, UnknownJobState};
pub use request::{ConnectionId, Payload, PendingRequest, RequestKind, Subject};
pub use time_fmt::{format_timestamp, parse_hms, parse_timestamp, DurationError};
pub use user::User;
pub use vehicle::{VehicleRegistration, Vin};
