// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vc pending` - review submissions awaiting a decision

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use vc_core::{Payload, PendingRequest, RequestId};
use vc_engine::DeadLetter;

use crate::client::{DaemonClient, Decided};
use crate::output::{print_json, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct PendingArgs {
    #[command(subcommand)]
    pub command: PendingCommand,
}

#[derive(Subcommand)]
pub enum PendingCommand {
    /// List requests awaiting a decision, oldest first
    List,
    /// Accept a request and persist it
    Approve {
        /// Request ID
        id: RequestId,
    },
    /// Discard a request
    Reject {
        /// Request ID
        id: RequestId,
    },
    /// Approved requests that could not be saved
    Failed,
}

pub async fn handle(
    command: PendingCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        PendingCommand::List => {
            let requests = client.list_pending().await?;
            match format {
                OutputFormat::Text if requests.is_empty() => println!("No pending requests"),
                OutputFormat::Text => pending_table(&requests).print()?,
                OutputFormat::Json => print_json(&requests)?,
            }
        }
        PendingCommand::Approve { id } => {
            let decided = client.approve(id).await?;
            report_decision(decided, "approved", format)?;
        }
        PendingCommand::Reject { id } => {
            let decided = client.reject(id).await?;
            report_decision(decided, "rejected", format)?;
        }
        PendingCommand::Failed => {
            let entries = client.dead_letters().await?;
            match format {
                OutputFormat::Text if entries.is_empty() => println!("No failed approvals"),
                OutputFormat::Text => dead_letter_table(&entries).print()?,
                OutputFormat::Json => print_json(&entries)?,
            }
        }
    }
    Ok(())
}

fn report_decision(decided: Decided, verb: &str, format: OutputFormat) -> Result<()> {
    let id = match decided {
        Decided::Yes(id) => id,
        Decided::NotFound(id) => bail!("request {id} is no longer pending"),
    };
    match format {
        OutputFormat::Text => println!("Request {id} {verb}"),
        OutputFormat::Json => print_json(&serde_json::json!({ "id": id, "decision": verb }))?,
    }
    Ok(())
}

pub(crate) fn pending_table(requests: &[PendingRequest]) -> Table {
    let mut table = Table::new(vec![
        Column::right("ID"),
        Column::left("SUBJECT"),
        Column::left("SUBMITTER").with_max(32),
        Column::left("DETAILS"),
    ]);
    for request in requests {
        table.row(vec![
            request.id.to_string(),
            request.payload.subject().to_string(),
            request.submitter.clone(),
            details(&request.payload),
        ]);
    }
    table
}

pub(crate) fn dead_letter_table(entries: &[DeadLetter]) -> Table {
    let mut table = Table::new(vec![
        Column::right("ID"),
        Column::left("SUBJECT"),
        Column::left("FAILED AT"),
        Column::left("ERROR"),
    ]);
    for entry in entries {
        table.row(vec![
            entry.request.id.to_string(),
            entry.request.payload.subject().to_string(),
            vc_core::format_timestamp(&entry.failed_at),
            entry.error.clone(),
        ]);
    }
    table
}

fn details(payload: &Payload) -> String {
    match payload {
        Payload::Job(job) => format!("{} ({}, due {})", job.name, job.duration, job.deadline),
        Payload::Vehicle(v) => format!("{} {} {} ({})", v.year, v.make, v.model, v.residency_time),
    }
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
