// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use tempfile::tempdir;

fn test_config(dir: &Path) -> Config {
    let mut config = Config::load_from(dir.to_path_buf()).unwrap();
    config.bind = IpAddr::V4(Ipv4Addr::LOCALHOST);
    config.port = 0;
    config
}

#[tokio::test]
#[serial]
async fn startup_takes_the_lock_and_binds_both_sockets() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let result = startup(&config).await.unwrap();

    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert!(config.socket_path.exists());
    assert!(result.submissions.local_addr().unwrap().port() > 0);
    assert_eq!(result.daemon.controller.pending_len(), 0);
}

#[tokio::test]
#[serial]
async fn startup_lock_failed_does_not_remove_existing_files() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let _running = startup(&config).await.unwrap();

    // Attempt startup while the first daemon holds the lock
    let second = startup(&config).await;

    assert!(matches!(second, Err(LifecycleError::LockFailed(_))));
    assert!(config.lock_path.exists(), "PID file must survive");
    assert!(config.socket_path.exists(), "socket must survive");
}

#[tokio::test]
#[serial]
async fn stale_socket_is_replaced() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::write(&config.socket_path, b"stale").unwrap();

    let result = startup(&config).await;

    assert!(result.is_ok());
}

#[tokio::test]
#[serial]
async fn failed_listen_cleans_up() {
    let dir = tempdir().unwrap();
    let mut config = test_config(dir.path());
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    config.port = taken.local_addr().unwrap().port();

    let result = startup(&config).await;

    assert!(matches!(result, Err(LifecycleError::ListenFailed(..))));
    assert!(!config.lock_path.exists());
    assert!(!config.socket_path.exists());
}

#[tokio::test]
#[serial]
async fn shutdown_removes_socket_and_pid_file() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let StartupResult { daemon, engine, .. } = startup(&config).await.unwrap();
    let engine = tokio::spawn(engine.run());

    daemon.shutdown().unwrap();

    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
    tokio::time::timeout(std::time::Duration::from_secs(5), engine)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
#[serial]
async fn restart_restores_pending_requests() {
    use vc_core::{parse_timestamp, Job, Payload};

    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    {
        let StartupResult { daemon, engine, .. } = startup(&config).await.unwrap();
        let engine = tokio::spawn(engine.run());
        daemon.controller.submit_for_approval(
            Payload::Job(Job::new(
                "J1",
                "render",
                1,
                "01:00:00",
                "2025-02-01",
                parse_timestamp("2025-01-01 08:00:00").unwrap(),
            )),
            Some(1),
            None,
        );
        daemon.shutdown().unwrap();
        engine.await.unwrap();
    }

    let restarted = startup(&config).await.unwrap();

    assert_eq!(restarted.daemon.controller.pending_len(), 1);
}

#[test]
#[serial]
fn startup_marker_is_appended() {
    let dir = tempdir().unwrap();
    let config = Config::load_from(dir.path().to_path_buf()).unwrap();
    std::fs::write(&config.log_path, "earlier line\n").unwrap();

    write_startup_marker(&config).unwrap();

    let log = std::fs::read_to_string(&config.log_path).unwrap();
    let last = log.lines().last().unwrap();
    assert!(log.starts_with("earlier line\n"));
    assert_eq!(last, format!("{}{})", STARTUP_MARKER_PREFIX, std::process::id()));
}
