// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers for behavioral specifications.
//!
//! Provides a high-level DSL for driving `barn`/`barnd` as black boxes:
//! every test gets its own base directory and config file, starts a real
//! daemon process, and talks to it only through the `barn` CLI or direct
//! filesystem reads -- exactly what an end user can observe.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

pub const POLL_INTERVAL_MS: u64 = 10;
pub const WAIT_MAX_MS: u64 = 5000;

/// Returns the path to a workspace binary, checking llvm-cov's target
/// directory first, then the standard one, then resolving relative to
/// the test binary itself as a fallback for non-standard target dirs.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

fn barn_binary() -> PathBuf {
    binary_path("barn")
}

pub fn barnd_binary() -> PathBuf {
    binary_path("barnd")
}

/// Poll a condition until it returns true or the timeout elapses.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll_interval = Duration::from_millis(POLL_INTERVAL_MS);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

/// Options for [`Project::with_limits`]; fields left at their Barn
/// defaults unless the test overrides them.
#[derive(Clone)]
pub struct LimitsConfig {
    pub max_high: u32,
    pub max_medium: u32,
    pub max_low: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_high: 2, max_medium: 8, max_low: 32 }
    }
}

/// A temporary Barn base directory with its own `barn.toml`, isolated
/// from every other test and from the caller's real environment.
pub struct Project {
    dir: tempfile::TempDir,
    config_path: PathBuf,
    limits: LimitsConfig,
    stale_heartbeat_threshold_secs: u64,
}

impl Project {
    /// A project with fast poll/heartbeat intervals so specs don't have
    /// to sleep for whole seconds to observe a scheduler tick.
    pub fn new() -> Self {
        Self::with_limits(LimitsConfig::default())
    }

    pub fn with_limits(limits: LimitsConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("barn.toml");
        let project = Self { dir, config_path, limits, stale_heartbeat_threshold_secs: 30 };
        project.write_config();
        project
    }

    /// Used by the crash-recovery spec, which needs a short stale
    /// threshold so recovery doesn't require a real 30s wait.
    pub fn with_stale_threshold_secs(mut self, secs: u64) -> Self {
        self.stale_heartbeat_threshold_secs = secs;
        self.write_config();
        self
    }

    fn write_config(&self) {
        let base_dir = self.dir.path().join("base");
        let toml = format!(
            r#"
[daemon]
base_dir = {base_dir:?}
poll_interval_ms = 20
shutdown_timeout_secs = 5
stale_heartbeat_threshold_secs = {stale}
heartbeat_interval_secs = 1

[limits]
max_high = {max_high}
max_medium = {max_medium}
max_low = {max_low}

[reaper]
enabled = false
"#,
            base_dir = base_dir.display(),
            stale = self.stale_heartbeat_threshold_secs,
            max_high = self.limits.max_high,
            max_medium = self.limits.max_medium,
            max_low = self.limits.max_low,
        );
        std::fs::write(&self.config_path, toml).unwrap();
    }

    pub fn base_dir(&self) -> PathBuf {
        self.dir.path().join("base")
    }

    pub fn socket_path(&self) -> PathBuf {
        self.base_dir().join("barn.sock")
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Build a `barn` invocation scoped to this project's config.
    pub fn barn(&self) -> CliBuilder {
        CliBuilder::new(barn_binary(), self.config_path.clone())
    }

    /// Starts `barnd` detached and waits for its socket to appear.
    pub fn start_daemon(&self) -> DaemonHandle {
        let child = Command::new(barnd_binary())
            .arg("--config")
            .arg(&self.config_path)
            .arg("--detach")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("barnd should spawn");

        let socket = self.socket_path();
        assert!(
            wait_for(WAIT_MAX_MS, || socket.exists()),
            "barnd did not create its socket within {WAIT_MAX_MS}ms"
        );
        DaemonHandle { child }
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        let mut cmd = self.barn().args(&["daemon", "stop"]).command();
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        let _ = cmd.status();
    }
}

/// A running `barnd` process spawned directly (bypassing `barn daemon
/// start`), so tests can simulate a hard crash with [`DaemonHandle::kill`].
pub struct DaemonHandle {
    child: std::process::Child,
}

impl DaemonHandle {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Sends SIGKILL, simulating a crash. The base directory is left
    /// exactly as it was: lock file held, any RUNNING job's manifest
    /// unchanged, process tree orphaned.
    #[cfg(unix)]
    pub fn kill(mut self) {
        let _ = nix::sys::signal::kill(
            nix::unistd::Pid::from_raw(self.child.id() as i32),
            nix::sys::signal::Signal::SIGKILL,
        );
        let _ = self.child.wait();
    }
}

/// Fluent builder for a single `barn` invocation.
pub struct CliBuilder {
    binary: PathBuf,
    config: PathBuf,
    args: Vec<String>,
    json: bool,
}

impl CliBuilder {
    fn new(binary: PathBuf, config: PathBuf) -> Self {
        Self { binary, config, args: Vec::new(), json: false }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    pub fn command(self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--config").arg(&self.config);
        if self.json {
            cmd.arg("--json");
        }
        cmd.args(&self.args);
        cmd.env_remove("NO_COLOR").env("NO_COLOR", "1");
        cmd
    }

    pub fn run(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("barn should run");
        RunAssert { output }
    }

    pub fn passes(self) -> RunAssert {
        let result = self.run();
        assert!(
            result.output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            result.output.status.code(),
            result.stdout(),
            result.stderr()
        );
        result
    }

    pub fn fails(self) -> RunAssert {
        let result = self.run();
        assert!(
            !result.output.status.success(),
            "expected command to fail, but it passed\nstdout: {}",
            result.stdout()
        );
        result
    }
}

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

    pub fn exit_code(&self) -> i32 {
        self.output.status.code().unwrap_or(-1)
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        assert!(self.stdout().contains(expected), "stdout does not contain {expected:?}\nstdout: {}", self.stdout());
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        assert!(self.stderr().contains(expected), "stderr does not contain {expected:?}\nstderr: {}", self.stderr());
        self
    }
}

/// Reads a job's manifest fields back by shelling out to `barn describe
/// --json`, which is how a real user would inspect state -- never reach
/// into the base directory directly except to read raw log files.
pub fn describe_json(project: &Project, id: &str) -> serde_json::Value {
    let out = project.barn().args(&["describe", id]).json().passes();
    serde_json::from_str(&out.stdout()).expect("describe --json should print valid JSON")
}

pub fn stdout_log(project: &Project, id: &str) -> String {
    let path = project.base_dir().join("jobs").join(id).join("logs").join("stdout.log");
    std::fs::read_to_string(path).unwrap_or_default()
}
