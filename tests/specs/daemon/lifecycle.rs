//! Daemon lifecycle specs

use crate::prelude::*;

#[test]
fn fresh_daemon_reports_empty_status() {
    let controller = Controller::started();

    controller
        .vc()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Status: running")
        .stdout_has("Pending: 0")
        .stdout_has("Submitters connected: 0");
}

#[test]
fn second_daemon_refuses_to_start() {
    let controller = Controller::started();

    let output = controller.spawn_daemon().wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("vcd is already running"));
}

#[test]
fn stop_removes_socket_and_pid_file() {
    let mut controller = Controller::started();

    controller
        .vc()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon stopping");

    assert!(controller.wait_exit(), "log: {}", controller.daemon_log());
    assert!(!controller.state_path().join("daemon.sock").exists());
    assert!(!controller.state_path().join("daemon.pid").exists());
}

#[test]
fn startup_marker_is_logged() {
    let controller = Controller::started();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || controller
        .daemon_log()
        .contains("--- vcd: starting (pid: ")));
}
