//! Test helpers for behavioral specifications.
//!
//! Provides a small DSL for driving the `vc` CLI against a real `vcd`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};

use assert_cmd::assert::OutputAssertExt;

// Aggressive timeouts for fast tests.
const VC_TIMEOUT_IPC_MS: &str = "500";
const VC_RETRY_MS: &str = "50";

// Spec polling timeouts
pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 3000;

/// Path to a workspace binary.
///
/// The binaries belong to other workspace members, so cargo does not hand
/// their paths to this package. They are built into the same target
/// directory as the spec binary (`target/debug/deps/specs-<hash>`), which
/// is checked first, then the usual locations under the manifest dir.
fn binary_path(name: &str) -> PathBuf {
    let file = format!("{name}{}", std::env::consts::EXE_SUFFIX);

    if let Ok(exe) = std::env::current_exe() {
        if let Some(profile_dir) = exe.parent().and_then(|deps| deps.parent()) {
            let beside = profile_dir.join(&file);
            if beside.exists() {
                return beside;
            }
        }
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let llvm_cov = manifest_dir.join("target/llvm-cov-target/debug").join(&file);
    if llvm_cov.exists() {
        return llvm_cov;
    }
    manifest_dir.join("target/debug").join(&file)
}

pub fn vc_binary() -> PathBuf {
    binary_path("vc")
}

pub fn vcd_binary() -> PathBuf {
    binary_path("vcd")
}

/// Create a CLI builder for vc commands
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions
pub struct CliBuilder {
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            envs: vec![
                ("VC_TIMEOUT_IPC_MS".into(), VC_TIMEOUT_IPC_MS.into()),
                ("VC_RETRY_MS".into(), VC_RETRY_MS.into()),
            ],
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    /// Build the command without running it
    pub fn command(self) -> Command {
        let mut cmd = Command::new(vc_binary());
        cmd.args(&self.args);
        // Keep a developer's own controller out of the tests
        cmd.env_remove("VC_ADDR");
        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    fn output(self) -> Output {
        self.command().output().expect("command should run")
    }

    /// Run and expect success (exit code 0)
    pub fn passes(self) -> RunAssert {
        let assert = self.command().assert().success();
        RunAssert {
            output: assert.get_output().clone(),
        }
    }

    /// Run and expect failure (non-zero exit code)
    pub fn fails(self) -> RunAssert {
        let assert = self.command().assert().failure();
        RunAssert {
            output: assert.get_output().clone(),
        }
    }

    /// Run and return the raw output, whatever the exit code
    pub fn run(self) -> RunAssert {
        RunAssert {
            output: self.output(),
        }
    }
}

/// Result of a CLI run for chaining assertions
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    /// Assert stdout equals expected exactly (with diff on failure).
    pub fn stdout_eq(self, expected: &str) -> Self {
        let stdout = self.stdout();
        similar_asserts::assert_eq!(stdout, expected);
        self
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }
}

/// Poll a condition until it returns true or timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

/// Isolated state directory and submission port for one test.
pub struct Controller {
    state_dir: tempfile::TempDir,
    port: u16,
    daemon: Option<Child>,
}

impl Controller {
    /// A controller that has not been started yet
    pub fn new() -> Self {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        Self {
            state_dir: tempfile::tempdir().unwrap(),
            port,
            daemon: None,
        }
    }

    /// Start `vcd` and wait for its control socket
    pub fn started() -> Self {
        let mut controller = Self::new();
        controller.daemon = Some(controller.spawn_daemon());
        let socket = controller.state_path().join("daemon.sock");
        assert!(
            wait_for(SPEC_WAIT_MAX_MS, || socket.exists()),
            "daemon did not start\nlog: {}",
            controller.daemon_log()
        );
        controller
    }

    /// Spawn another `vcd` against the same state directory
    pub fn spawn_daemon(&self) -> Child {
        Command::new(vcd_binary())
            .env("VC_STATE_DIR", self.state_path())
            .env("VC_BIND", "127.0.0.1")
            .env("VC_PORT", self.port.to_string())
            .env("VC_NOTIFY", "none")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("vcd should spawn")
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    pub fn addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Run vc against this controller
    pub fn vc(&self) -> CliBuilder {
        cli()
            .env("VC_STATE_DIR", self.state_path())
            .env("VC_ADDR", self.addr())
    }

    /// Read the daemon log file contents (for debugging test failures)
    pub fn daemon_log(&self) -> String {
        let log_path = self.state_path().join("daemon.log");
        std::fs::read_to_string(log_path).unwrap_or_else(|_| "(no daemon log)".to_string())
    }

    /// Wait for the daemon process to exit, returning whether it did
    pub fn wait_exit(&mut self) -> bool {
        let Some(child) = self.daemon.as_mut() else {
            return true;
        };
        wait_for(SPEC_WAIT_MAX_MS, || matches!(child.try_wait(), Ok(Some(_))))
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if let Some(mut child) = self.daemon.take() {
            let _ = self.vc().args(&["daemon", "stop"]).command().output();
            if !wait_for(SPEC_WAIT_MAX_MS, || matches!(child.try_wait(), Ok(Some(_)))) {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}
