//! Help and version output specs

use crate::prelude::*;

#[test]
fn workspace_binaries_are_located() {
    assert!(vc_binary().is_file(), "missing {}", vc_binary().display());
    assert!(vcd_binary().is_file(), "missing {}", vcd_binary().display());
}

#[test]
fn vc_help_lists_command_groups() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("pending")
        .stdout_has("schedule")
        .stdout_has("submit")
        .stdout_has("daemon");
}

#[test]
fn vc_without_command_prints_help() {
    cli().passes().stdout_has("Usage: vc");
}

#[test]
fn vcd_version_prints_package_version() {
    let output = std::process::Command::new(vcd_binary())
        .arg("--version")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        format!("vcd {}\n", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn vcd_rejects_unknown_arguments() {
    let output = std::process::Command::new(vcd_binary())
        .arg("--frobnicate")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unexpected argument"));
}
