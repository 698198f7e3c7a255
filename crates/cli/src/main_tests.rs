// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use yare::parameterized;

use super::{format_error, Cli, Commands};
use crate::output::OutputFormat;

#[test]
fn version_long() {
    let err = Cli::command()
        .try_get_matches_from(["vc", "--version"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayVersion);
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[parameterized(
    pending_list = { &["vc", "pending", "list"] },
    approve = { &["vc", "pending", "approve", "3"] },
    failed = { &["vc", "pending", "failed"] },
    advance = { &["vc", "schedule", "advance"] },
    summary = { &["vc", "schedule", "summary"] },
    stop = { &["vc", "daemon", "stop"] },
)]
fn operator_commands_parse(argv: &[&str]) {
    assert!(Cli::try_parse_from(argv).is_ok());
}

#[test]
fn output_flag_is_global() {
    let cli = Cli::try_parse_from(["vc", "schedule", "report", "-o", "json"]).unwrap();
    assert_eq!(cli.output, OutputFormat::Json);
    assert!(matches!(cli.command, Some(Commands::Schedule(_))));
}

#[test]
fn missing_subcommand_is_allowed() {
    let cli = Cli::try_parse_from(["vc"]).unwrap();
    assert!(cli.command.is_none());
}

#[test]
fn redundant_causes_are_not_repeated() {
    let err = anyhow::anyhow!(std::io::Error::other("socket gone"))
        .context("request failed: socket gone");
    assert_eq!(format_error(&err), "request failed: socket gone");
}

#[test]
fn new_causes_are_listed() {
    let err = anyhow::anyhow!(std::io::Error::other("socket gone")).context("request failed");
    assert_eq!(
        format_error(&err),
        "request failed\n\nCaused by:\n    0: socket gone"
    );
}
