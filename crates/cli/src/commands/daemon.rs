// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vc daemon` - controller daemon health and shutdown

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::client::{DaemonClient, DaemonStatus};
use crate::output::{format_uptime, print_json, OutputFormat};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Uptime, pending requests and connected submitters
    Status,
    /// Ask the daemon to stop after in-flight approvals settle
    Stop,
    /// Version of the running daemon
    Version,
}

pub async fn handle(
    command: DaemonCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        DaemonCommand::Status => {
            let status = client.status().await?;
            match format {
                OutputFormat::Text => print!("{}", describe_status(&status)),
                OutputFormat::Json => print_json(&status)?,
            }
        }
        DaemonCommand::Stop => {
            client.shutdown().await?;
            if format == OutputFormat::Text {
                println!("Daemon stopping");
            }
        }
        DaemonCommand::Version => {
            let version = client.hello().await?;
            match format {
                OutputFormat::Text => println!("vcd {version}"),
                OutputFormat::Json => print_json(&serde_json::json!({ "version": version }))?,
            }
        }
    }
    Ok(())
}

pub(crate) fn describe_status(status: &DaemonStatus) -> String {
    let mut out = format!("Status: running ({})\n", format_uptime(status.uptime_secs));
    out.push_str(&format!("Pending: {}\n", status.pending));
    out.push_str(&format!("Submitters connected: {}\n", status.connections));
    if status.dead_letters > 0 {
        out.push_str(&format!(
            "Failed approvals: {} (see `vc pending failed`)\n",
            status.dead_letters
        ));
    }
    out
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
