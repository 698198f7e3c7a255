// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vehicular cloud controller daemon (vcd)
//!
//! Architecture:
//! - Engine task: owns scheduling and post-approval bookkeeping
//! - Submission server: TCP line protocol for remote submitters
//! - Listener task: operator control socket
//! - Notifier task: desktop notices for requests that need a decision

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::sync::Arc;
use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info, warn};
use vc_adapters::Notifier;
use vc_core::SystemClock;
use vc_daemon::lifecycle::{self, Config, LifecycleError, StartupResult};
use vc_daemon::listener::{ListenCtx, Listener};
use vc_daemon::notices::spawn_notifier;
use vc_daemon::server::ProtocolServer;

/// How long in-flight approvals get to settle on shutdown
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("vcd {VERSION}");
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: vcd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;

    // Written before tracing is set up, so the marker precedes this run's lines
    lifecycle::write_startup_marker(&config)?;
    let log_guard = setup_logging(&config)?;

    info!(state_dir = %config.state_dir.display(), "Starting controller daemon");

    let StartupResult {
        daemon,
        engine,
        control,
        submissions,
    } = match lifecycle::startup(&config).await {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("vcd is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            // tracing is non-blocking and may not flush before exit
            lifecycle::write_startup_error(&config, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let engine_task = tokio::spawn(engine.run());

    spawn_notifier(
        daemon.controller.events().subscribe(),
        Notifier::for_mode(config.notify),
    );

    let server = ProtocolServer::new(
        submissions,
        daemon.controller.clone(),
        SystemClock,
        config.server_config(),
    );
    let submit_addr = server.local_addr()?;
    let clients = server.clients();
    tokio::spawn(server.run());

    let shutdown_notify = Arc::new(Notify::new());
    let listener = Listener::new(
        control,
        ListenCtx {
            controller: daemon.controller.clone(),
            clients,
            start_time: daemon.start_time,
            shutdown: Arc::clone(&shutdown_notify),
        },
    );
    tokio::spawn(listener.run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        submissions = %submit_addr,
        control = %config.socket_path.display(),
        scope = %config.outcome_scope,
        notify = %config.notify,
        "Daemon ready"
    );

    // Signal ready for a parent process waiting on startup
    println!("READY");

    tokio::select! {
        _ = shutdown_notify.notified() => info!("Shutdown requested via command"),
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
    }

    daemon.shutdown()?;
    match tokio::time::timeout(SHUTDOWN_GRACE, engine_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("engine task failed: {}", e),
        Err(_) => warn!("engine did not stop within {:?}", SHUTDOWN_GRACE),
    }

    info!("Daemon stopped");
    drop(log_guard);
    Ok(())
}

fn print_help() {
    println!("vcd {VERSION}");
    println!("Vehicular cloud controller daemon - gates job and vehicle submissions");
    println!("behind operator approval and schedules approved jobs in FIFO order");
    println!();
    println!("USAGE:");
    println!("    vcd");
    println!();
    println!("Submitters connect over TCP (default port 9876). Operators use the");
    println!("`vc` CLI, which talks to the daemon over a Unix socket.");
    println!();
    println!("ENVIRONMENT:");
    println!("    VC_STATE_DIR             State directory (default ~/.local/state/vc)");
    println!("    VC_BIND, VC_PORT         Submission listen address");
    println!("    VC_MAX_CONNECTIONS       Concurrent submitter connections");
    println!("    VC_MAX_APPROVAL_WORKERS  Concurrent approval writes");
    println!("    VC_OUTCOME_SCOPE         all | submitter");
    println!("    VC_NOTIFY                desktop | none");
    println!("    RUST_LOG                 Log filter (default info)");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
