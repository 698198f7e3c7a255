//! Behavioral specifications for the vc CLI and vcd daemon.
//!
//! These tests are black-box: they invoke the binaries and verify
//! stdout, stderr, and exit codes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/help.rs"]
mod cli_help;

// daemon/
#[path = "specs/daemon/lifecycle.rs"]
mod daemon_lifecycle;

// approval/
#[path = "specs/approval/flow.rs"]
mod approval_flow;
