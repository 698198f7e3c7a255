//! CLI error handling specs

use crate::prelude::*;

#[test]
fn operator_commands_need_a_running_daemon() {
    let controller = Controller::new();

    controller
        .vc()
        .args(&["pending", "list"])
        .fails()
        .stderr_has("Daemon not running");
}

#[test]
fn submit_reports_unreachable_controller() {
    let controller = Controller::new();

    controller
        .vc()
        .args(&[
            "submit", "job", "--owner", "1", "--id", "J1", "--name", "Render", "--duration",
            "01:00:00", "--deadline", "2025-02-01",
        ])
        .fails()
        .stderr_has("could not reach the controller");
}

#[test]
fn request_ids_must_be_numeric() {
    cli()
        .args(&["pending", "approve", "first"])
        .fails()
        .stderr_has("invalid value 'first'");
}
