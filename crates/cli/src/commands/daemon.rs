// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barn daemon start|stop|status|restart` -- process lifecycle for
//! `barnd`. The wire protocol has no `Stop` request (§4.13 lists
//! `Create, Cancel, Kill, Describe, List, Clean, Status, Reload` only), so
//! stopping the daemon is a signal against its recorded pid, not an IPC
//! call.

use std::time::Duration;

use barn_daemon::Config;
use clap::Subcommand;

use crate::client::socket_exists;
use crate::exit_error::ExitError;

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start `barnd` in the background (or foreground with --foreground).
    Start {
        #[arg(long)]
        foreground: bool,
    },
    /// Stop a running `barnd`.
    Stop,
    /// Report whether `barnd` is running.
    Status,
    /// Stop and start `barnd`.
    Restart {
        #[arg(long)]
        foreground: bool,
    },
}

pub async fn run(config: &Config, command: DaemonCommand) -> Result<(), ExitError> {
    match command {
        DaemonCommand::Start { foreground } => start(config, foreground).await,
        DaemonCommand::Stop => stop(config).await,
        DaemonCommand::Status => status(config),
        DaemonCommand::Restart { foreground } => {
            let _ = stop(config).await;
            start(config, foreground).await
        }
    }
}

fn read_pid(config: &Config) -> Option<u32> {
    let pid_file = barn_storage::fs::pid_file_path(&config.base_dir);
    std::fs::read_to_string(pid_file).ok()?.trim().parse().ok()
}

#[cfg(unix)]
fn is_alive(pid: u32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None).is_ok()
}

#[cfg(not(unix))]
fn is_alive(_pid: u32) -> bool {
    false
}

fn status(config: &Config) -> Result<(), ExitError> {
    match read_pid(config) {
        Some(pid) if is_alive(pid) => println!("barnd is running (pid {pid})"),
        _ => println!("barnd is not running"),
    }
    Ok(())
}

async fn start(config: &Config, foreground: bool) -> Result<(), ExitError> {
    if let Some(pid) = read_pid(config) {
        if is_alive(pid) {
            return Err(ExitError::new(1, format!("barnd is already running (pid {pid})")));
        }
    }

    let exe = barnd_path()?;
    let mut command = std::process::Command::new(exe);

    if foreground {
        let status = command.status().map_err(|e| ExitError::new(1, format!("starting barnd: {e}")))?;
        if !status.success() {
            return Err(ExitError::new(1, "barnd exited with an error".to_string()));
        }
        return Ok(());
    }

    command.arg("--detach");
    command.stdin(std::process::Stdio::null());
    command.stdout(std::process::Stdio::null());
    command.stderr(std::process::Stdio::null());
    command.spawn().map_err(|e| ExitError::new(1, format!("starting barnd: {e}")))?;

    wait_for_socket(config).await?;
    println!("barnd started");
    Ok(())
}

async fn stop(config: &Config) -> Result<(), ExitError> {
    let pid = read_pid(config).ok_or_else(|| ExitError::new(1, "barnd is not running".to_string()))?;
    if !is_alive(pid) {
        return Err(ExitError::new(1, "barnd is not running".to_string()));
    }

    signal_interrupt(pid)?;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
    while tokio::time::Instant::now() < deadline {
        if !is_alive(pid) {
            println!("barnd stopped");
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    Err(ExitError::new(1, format!("barnd (pid {pid}) did not stop within 30s")))
}

#[cfg(unix)]
fn signal_interrupt(pid: u32) -> Result<(), ExitError> {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), nix::sys::signal::Signal::SIGINT)
        .map_err(|e| ExitError::new(1, format!("signaling barnd: {e}")))
}

#[cfg(not(unix))]
fn signal_interrupt(_pid: u32) -> Result<(), ExitError> {
    Err(ExitError::new(1, "stopping barnd by signal is not supported on this platform".to_string()))
}

async fn wait_for_socket(config: &Config) -> Result<(), ExitError> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while tokio::time::Instant::now() < deadline {
        if socket_exists(&config.socket_path) {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    Err(ExitError::new(1, "barnd did not come up within 10s".to_string()))
}

/// `barnd` is expected to live next to `barn` in the same install --
/// resolved relative to the current executable so both binaries can be
/// relocated together without a hardcoded path.
fn barnd_path() -> Result<std::path::PathBuf, ExitError> {
    let exe = std::env::current_exe().map_err(|e| ExitError::new(1, format!("locating barn: {e}")))?;
    let dir = exe.parent().ok_or_else(|| ExitError::new(1, "barn has no parent directory".to_string()))?;
    let candidate = dir.join(if cfg!(windows) { "barnd.exe" } else { "barnd" });
    if candidate.is_file() {
        Ok(candidate)
    } else {
        Ok(std::path::PathBuf::from(if cfg!(windows) { "barnd.exe" } else { "barnd" }))
    }
}
