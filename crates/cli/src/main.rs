// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vc - vehicular cloud controller CLI

mod client;
mod commands;
mod env;
mod exit_error;
mod output;
mod table;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{daemon, pending, schedule, submit};
use output::OutputFormat;

use crate::client::DaemonClient;

#[derive(Parser)]
#[command(name = "vc", version, about = "Vehicular cloud controller")]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Review and decide pending submissions
    Pending(pending::PendingArgs),
    /// Job queue, completion estimates and reports
    Schedule(schedule::ScheduleArgs),
    /// Submit a job or vehicle as a client
    Submit(submit::SubmitArgs),
    /// Daemon status and shutdown
    Daemon(daemon::DaemonArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Render an error and its causes, skipping causes the top line already repeats.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let mut buf = top.clone();
    for (i, cause) in err
        .chain()
        .skip(1)
        .map(|c| c.to_string())
        .filter(|c| !top.contains(c.as_str()))
        .enumerate()
    {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        // Submissions go over TCP to the submission server, not the control socket
        Commands::Submit(args) => submit::handle(args, format).await,
        Commands::Pending(args) => {
            pending::handle(args.command, &DaemonClient::connect()?, format).await
        }
        Commands::Schedule(args) => {
            schedule::handle(args.command, &DaemonClient::connect()?, format).await
        }
        Commands::Daemon(args) => {
            daemon::handle(args.command, &DaemonClient::connect()?, format).await
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
