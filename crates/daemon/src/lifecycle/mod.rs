// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

mod config;

pub use config::Config;

use std::fs::File;
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use thiserror::Error;
use tokio::net::{TcpListener, UnixListener};
use tracing::{info, warn};
use vc_core::SystemClock;
use vc_engine::{Controller, Engine, EngineError};
use vc_storage::{FileStore, StoreError};

/// Startup marker prefix written to the log before anything else.
/// Full format: "--- vcd: starting (pid: 12345)"
pub const STARTUP_MARKER_PREFIX: &str = "--- vcd: starting (pid: ";

/// Engine over the durable store and the wall clock
pub type DaemonEngine = Engine<FileStore, SystemClock>;

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub controller: Controller,
    pub start_time: Instant,
}

/// Everything startup produced; the caller spawns the tasks.
pub struct StartupResult {
    pub daemon: DaemonState,
    pub engine: DaemonEngine,
    /// Operator control socket
    pub control: UnixListener,
    /// Submission server socket
    pub submissions: TcpListener,
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Failed to listen on {0}: {1}")]
    ListenFailed(SocketAddr, std::io::Error),

    #[error("Invalid config in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value {value:?} for {name}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // A failed lock means the files belong to the running daemon
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Lock first. Don't truncate before holding it, or a running daemon's
    // PID would be wiped.
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    let store = Arc::new(FileStore::open(&config.store_path)?);
    let (controller, engine) =
        Controller::start(store, SystemClock, config.controller_config())?;
    info!(
        pending = controller.pending_len(),
        store = %config.store_path.display(),
        "controller ready"
    );

    let addr = config.listen_addr();
    let submissions = TcpListener::bind(addr)
        .await
        .map_err(|e| LifecycleError::ListenFailed(addr, e))?;

    // Control socket last, only after everything else is in place
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let control = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            controller,
            start_time: Instant::now(),
        },
        engine,
        control,
        submissions,
    })
}

impl DaemonState {
    /// Stop the engine and remove the files that advertise a running daemon.
    ///
    /// The engine finishes in-flight approvals before it exits.
    pub fn shutdown(&self) -> Result<(), LifecycleError> {
        self.controller.shutdown();

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }
        // Lock itself is released when lock_file drops

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

/// Append the startup marker to the log, before tracing is set up.
pub fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{})", STARTUP_MARKER_PREFIX, std::process::id())?;
    Ok(())
}

/// Write a startup error synchronously so it survives a quick exit.
pub fn write_startup_error(config: &Config, error: &LifecycleError) {
    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

#[cfg(test)]
#[path = "../lifecycle_tests.rs"]
mod tests;
