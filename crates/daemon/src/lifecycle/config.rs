// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: defaults, then `vcd.toml`, then environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use vc_adapters::NotifyMode;
use vc_engine::ControllerConfig;

use super::LifecycleError;
use crate::env;
use crate::server::{OutcomeScope, ServerConfig};
use crate::submission::DEFAULT_PORT;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/vc)
    pub state_dir: PathBuf,
    /// Path to the operator control socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the store snapshot
    pub store_path: PathBuf,
    /// Optional settings file
    pub config_path: PathBuf,

    /// Address the submission server binds
    pub bind: IpAddr,
    pub port: u16,
    pub max_connections: usize,
    pub max_approval_workers: usize,
    pub outcome_scope: OutcomeScope,
    pub notify: NotifyMode,
}

/// Keys accepted in `vcd.toml`. Everything is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    bind: Option<IpAddr>,
    port: Option<u16>,
    max_connections: Option<usize>,
    max_approval_workers: Option<usize>,
    outcome_scope: Option<OutcomeScope>,
    notify: Option<NotifyMode>,
}

impl Config {
    /// Load configuration for the user-level daemon.
    pub fn load() -> Result<Self, LifecycleError> {
        Self::load_from(env::state_dir()?)
    }

    /// Load configuration rooted at `state_dir`.
    pub fn load_from(state_dir: PathBuf) -> Result<Self, LifecycleError> {
        let mut config = Self::defaults(state_dir);
        if let Some(file) = FileConfig::read(&config.config_path)? {
            config.apply_file(file);
        }
        config.apply_env()?;
        Ok(config)
    }

    fn defaults(state_dir: PathBuf) -> Self {
        let server = ServerConfig::default();
        let engine = ControllerConfig::default();
        Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            store_path: state_dir.join("store.json"),
            config_path: state_dir.join("vcd.toml"),
            state_dir,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_connections: server.max_connections,
            max_approval_workers: engine.max_approval_workers,
            outcome_scope: server.outcome_scope,
            notify: NotifyMode::default(),
        }
    }

    fn apply_file(&mut self, file: FileConfig) {
        let FileConfig {
            bind,
            port,
            max_connections,
            max_approval_workers,
            outcome_scope,
            notify,
        } = file;
        self.bind = bind.unwrap_or(self.bind);
        self.port = port.unwrap_or(self.port);
        self.max_connections = max_connections.unwrap_or(self.max_connections);
        self.max_approval_workers = max_approval_workers.unwrap_or(self.max_approval_workers);
        self.outcome_scope = outcome_scope.unwrap_or(self.outcome_scope);
        self.notify = notify.unwrap_or(self.notify);
    }

    fn apply_env(&mut self) -> Result<(), LifecycleError> {
        override_from_env(env::BIND, &mut self.bind)?;
        override_from_env(env::PORT, &mut self.port)?;
        override_from_env(env::MAX_CONNECTIONS, &mut self.max_connections)?;
        override_from_env(env::MAX_APPROVAL_WORKERS, &mut self.max_approval_workers)?;
        override_from_env(env::OUTCOME_SCOPE, &mut self.outcome_scope)?;
        override_from_env(env::NOTIFY, &mut self.notify)?;
        Ok(())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            max_connections: self.max_connections.max(1),
            outcome_scope: self.outcome_scope,
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            max_approval_workers: self.max_approval_workers.max(1),
            ..ControllerConfig::default()
        }
    }
}

impl FileConfig {
    fn read(path: &Path) -> Result<Option<Self>, LifecycleError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&text)
            .map(Some)
            .map_err(|source| LifecycleError::Config {
                path: path.to_path_buf(),
                source,
            })
    }
}

fn override_from_env<T: FromStr>(name: &'static str, slot: &mut T) -> Result<(), LifecycleError> {
    let Some(value) = env::var(name) else {
        return Ok(());
    };
    *slot = value
        .parse()
        .map_err(|_| LifecycleError::InvalidEnv { name, value })?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
