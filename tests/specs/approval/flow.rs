//! End-to-end approval specs: submitter, operator and scheduler together

use std::thread;

use crate::prelude::*;

const JOB: [&str; 12] = [
    "submit",
    "job",
    "--owner",
    "7",
    "--id",
    "J1",
    "--name",
    "Render",
    "--duration",
    "01:30:00",
    "--deadline",
    "2025-02-01",
];

fn pending_has(controller: &Controller, needle: &str) -> bool {
    controller
        .vc()
        .args(&["pending", "list"])
        .run()
        .stdout()
        .contains(needle)
}

#[test]
fn approved_job_starts_running() {
    let controller = Controller::started();

    controller
        .vc()
        .args(&JOB)
        .passes()
        .stdout_eq("Submitted job J1 for approval\n");
    assert!(wait_for(SPEC_WAIT_MAX_MS, || pending_has(&controller, "job J1")));

    controller
        .vc()
        .args(&["pending", "approve", "1"])
        .passes()
        .stdout_eq("Request 1 approved\n");

    assert!(wait_for(SPEC_WAIT_MAX_MS, || controller
        .vc()
        .args(&["schedule", "states"])
        .run()
        .stdout()
        .contains("In Progress")));
    controller
        .vc()
        .args(&["pending", "list"])
        .passes()
        .stdout_eq("No pending requests\n");
}

#[test]
fn decided_request_cannot_be_decided_again() {
    let controller = Controller::started();
    controller.vc().args(&JOB).passes();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || pending_has(&controller, "job J1")));

    controller.vc().args(&["pending", "reject", "1"]).passes();

    controller
        .vc()
        .args(&["pending", "approve", "1"])
        .fails()
        .stderr_has("request 1 is no longer pending");
}

#[test]
fn waiting_submitter_learns_of_rejection() {
    let controller = Controller::started();
    let waiting = controller.vc().args(&[
        "submit",
        "vehicle",
        "--wait",
        "--owner-text",
        "fleet",
        "--owner",
        "3",
        "--make",
        "Toyota",
        "--model",
        "Prius",
        "--year",
        "2020",
        "--vin",
        "V1",
        "--residency",
        "08:00:00",
    ]);
    let submitter = thread::spawn(move || waiting.run());

    assert!(wait_for(SPEC_WAIT_MAX_MS, || pending_has(&controller, "vehicle V1")));
    controller.vc().args(&["pending", "reject", "1"]).passes();

    let result = submitter.join().unwrap();
    assert_eq!(result.code(), Some(2));
    assert_eq!(result.stdout(), "vehicle V1 rejected\n");
}

#[test]
fn empty_queue_has_nothing_to_advance() {
    let controller = Controller::started();

    controller
        .vc()
        .args(&["schedule", "advance"])
        .passes()
        .stdout_eq("Nothing to advance\n");
    controller
        .vc()
        .args(&["schedule", "summary", "-o", "json"])
        .passes()
        .stdout_has("\"queued\": 0");
}
