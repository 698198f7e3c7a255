// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vc submit` - send a job or vehicle to the controller for approval

use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use vc_client::{ClientConfig, SubmissionClient};
use vc_core::{JobId, Subject, Vin};
use vc_daemon::{ClientMessage, NewJob, NewVehicle, ServerMessage, Verdict};

use crate::env::timeout_decision;
use crate::exit_error::ExitError;
use crate::output::{print_json, OutputFormat};

/// How long to wait for the first connection before giving up
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Args)]
pub struct SubmitArgs {
    /// Controller address (host:port), overrides VC_ADDR
    #[arg(long, global = true)]
    pub addr: Option<String>,

    /// Wait for the operator's decision before exiting
    #[arg(long, global = true)]
    pub wait: bool,

    #[command(subcommand)]
    pub command: SubmitCommand,
}

#[derive(Subcommand)]
pub enum SubmitCommand {
    /// Submit a job for approval
    Job {
        /// Submitting user's numeric ID
        #[arg(long)]
        owner: u32,
        #[arg(long, value_parser = field)]
        id: String,
        #[arg(long, value_parser = field)]
        name: String,
        /// Expected run time as HH:MM:SS
        #[arg(long, value_parser = field)]
        duration: String,
        /// Deadline as YYYY-MM-DD
        #[arg(long, value_parser = field)]
        deadline: String,
    },
    /// Offer a vehicle as a compute resource
    Vehicle {
        /// Free-form owner description
        #[arg(long, value_parser = field)]
        owner_text: String,
        /// Registered owner's numeric ID
        #[arg(long)]
        owner: u32,
        #[arg(long, value_parser = field)]
        make: String,
        #[arg(long, value_parser = field)]
        model: String,
        #[arg(long, value_parser = field)]
        year: String,
        #[arg(long, value_parser = field)]
        vin: String,
        /// Residency time as HH:MM:SS
        #[arg(long, value_parser = field)]
        residency: String,
    },
}

impl SubmitCommand {
    pub(crate) fn into_message(self) -> ClientMessage {
        match self {
            SubmitCommand::Job {
                owner,
                id,
                name,
                duration,
                deadline,
            } => ClientMessage::NewJob(NewJob {
                owner_id: owner,
                job_id: JobId::new(id),
                name,
                duration,
                deadline,
            }),
            SubmitCommand::Vehicle {
                owner_text,
                owner,
                make,
                model,
                year,
                vin,
                residency,
            } => ClientMessage::NewVehicle(NewVehicle {
                owner_text,
                vehicle_owner_id: owner,
                make,
                model,
                year,
                vin: Vin::new(vin),
                residency_time: residency,
            }),
        }
    }
}

/// A single wire field: no separators, no line breaks.
fn field(s: &str) -> Result<String, String> {
    if s.contains([',', '\n', '\r']) {
        return Err("must not contain commas or line breaks".to_string());
    }
    Ok(s.trim().to_string())
}

pub(crate) fn subject_of(message: &ClientMessage) -> Subject {
    match message {
        ClientMessage::NewJob(job) => Subject::Job(job.job_id.clone()),
        ClientMessage::NewVehicle(vehicle) => Subject::Vehicle(vehicle.vin.clone()),
    }
}

pub async fn handle(args: SubmitArgs, format: OutputFormat) -> Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(addr) = args.addr {
        config = config.with_addr(addr);
    }
    let addr = config.addr.clone();

    let mut client = SubmissionClient::start(config);
    if client.wait_connected(CONNECT_TIMEOUT).await.is_err() {
        bail!("could not reach the controller at {addr}");
    }

    let message = args.command.into_message();
    let subject = subject_of(&message);
    client.send(&message).await?;

    if !args.wait {
        match format {
            OutputFormat::Text => println!("Submitted {subject} for approval"),
            OutputFormat::Json => {
                print_json(&serde_json::json!({ "submitted": subject.to_string() }))?
            }
        }
        return Ok(());
    }

    let outcome = client.wait_for_outcome(&subject, timeout_decision()).await?;
    print_outcome(&outcome, format)?;
    if outcome.verdict() == Verdict::Rejected {
        return Err(ExitError::new(2, String::new()).into());
    }
    Ok(())
}

fn print_outcome(outcome: &ServerMessage, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{} {}", outcome.subject(), outcome.verdict()),
        OutputFormat::Json => print_json(&serde_json::json!({
            "subject": outcome.subject().to_string(),
            "verdict": outcome.verdict().to_string(),
        }))?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
