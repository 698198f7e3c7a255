// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vehicular cloud controller daemon library
//!
//! Hosts the submission server and the operator control socket. The wire
//! types are exported for the CLI and the submission client.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod env;
pub mod lifecycle;
pub mod listener;
pub mod notices;
pub mod protocol;
pub mod server;
pub mod submission;

pub use protocol::{Request, Response, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, PROTOCOL_VERSION};
pub use server::{ClientRegistry, OutcomeScope, ProtocolServer, ServerConfig};
pub use submission::{
    ClientMessage, NewJob, NewVehicle, ServerMessage, Verdict, WireError, DEFAULT_PORT,
};
