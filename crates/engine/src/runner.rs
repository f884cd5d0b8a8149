// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner (§4.6): runs exactly one job end to end -- launches the child,
//! streams its output to log files, drives a heartbeat, and reports the
//! terminal outcome back through the repository, possibly scheduling a
//! retry.

use crate::retry;
use barn_core::job::{ExitCode, Job};
use barn_core::Clock;
use barn_storage::{fs, JobRepository};
use rand::thread_rng;
use std::fs::OpenOptions;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io;
use tokio::process::Command;

/// What became of one runner invocation. The scheduler's per-level
/// counters are decremented regardless of which variant comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    Failed,
    Retried,
}

pub struct Runner<C: Clock> {
    repo: Arc<JobRepository<C>>,
    clock: C,
    heartbeat_interval: Duration,
}

impl<C: Clock + 'static> Runner<C> {
    pub fn new(repo: Arc<JobRepository<C>>, clock: C, heartbeat_interval: Duration) -> Self {
        Self { repo, clock, heartbeat_interval }
    }

    /// Runs `job` (which must be freshly QUEUED) to a persisted terminal or
    /// re-queued state. Blocking from the scheduler's point of view: this
    /// future only resolves once the outcome is durable.
    pub async fn run(&self, job: &Job) -> RunOutcome {
        let base_dir = self.repo.base_dir();
        let job_dir = fs::job_dir(base_dir, job.id.as_str());
        let work_dir = fs::work_dir(&job_dir);
        let stdout_path = fs::stdout_log_path(&job_dir);
        let stderr_path = fs::stderr_log_path(&job_dir);

        if let Err(e) = std::fs::create_dir_all(&work_dir) {
            return self.fail_to_start(job, &stderr_path, &format!("failed to create work dir: {e}")).await;
        }

        let stdout_file = match open_append(&stdout_path) {
            Ok(f) => f,
            Err(e) => {
                return self
                    .fail_to_start(job, &stderr_path, &format!("failed to open stdout.log: {e}"))
                    .await
            }
        };
        let stderr_file = match open_append(&stderr_path) {
            Ok(f) => f,
            Err(e) => {
                return self
                    .fail_to_start(job, &stderr_path, &format!("failed to open stderr.log: {e}"))
                    .await
            }
        };

        let mut command = Command::new(&job.command[0]);
        command
            .args(&job.command[1..])
            .current_dir(&work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file))
            .stderr(Stdio::from(stderr_file));
        #[cfg(unix)]
        {
            // Own process group so a kill targets the whole tree, not just
            // this one pid (§6 "process tree kill").
            command.process_group(0);
        }

        let mut child = match command.spawn() {
            Ok(c) => c,
            Err(e) => {
                return self
                    .fail_to_start(job, &stderr_path, &format!("failed to launch {:?}: {e}", job.command))
                    .await
            }
        };

        let pid = match child.id() {
            Some(pid) => pid as u64,
            None => {
                // Reaped before we could read the pid; treat as a launch
                // failure.
                return self
                    .fail_to_start(job, &stderr_path, "child exited before its pid could be read")
                    .await;
            }
        };

        if let Err(e) = self.repo.mark_started(job.id.as_str(), pid) {
            tracing::warn!(job_id = %job.id, error = %e, "failed to persist MarkStarted");
        }
        tracing::info!(job_id = %job.id, %pid, "job started");

        let heartbeat = self.spawn_heartbeat(job.id.as_str());
        let wait_result = child.wait().await;
        heartbeat.abort();

        match wait_result {
            Ok(status) => self.finish(job, status).await,
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, "runner interrupted waiting for child");
                if let Err(e) = self.repo.mark_failed(job.id.as_str(), "interrupted", &e.to_string()) {
                    tracing::warn!(job_id = %job.id, error = %e, "failed to persist MarkFailed(interrupted)");
                }
                RunOutcome::Failed
            }
        }
    }

    async fn fail_to_start(&self, job: &Job, stderr_path: &Path, message: &str) -> RunOutcome {
        tracing::warn!(job_id = %job.id, %message, "job failed to start");
        let _ = append_to(stderr_path, message);
        if let Err(e) = self.repo.mark_failed(job.id.as_str(), "start_failed", message) {
            tracing::warn!(job_id = %job.id, error = %e, "failed to persist MarkFailed(start_failed)");
        }
        RunOutcome::Failed
    }

    fn spawn_heartbeat(&self, job_id: &str) -> tokio::task::JoinHandle<()> {
        let repo = Arc::clone(&self.repo);
        let job_id = job_id.to_string();
        let interval = self.heartbeat_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = repo.update_heartbeat(&job_id) {
                    tracing::warn!(%job_id, error = %e, "failed to write heartbeat");
                }
            }
        })
    }

    async fn finish(&self, job: &Job, status: std::process::ExitStatus) -> RunOutcome {
        let exit_code = exit_code_of(status);
        tracing::info!(job_id = %job.id, %exit_code, "job exited");

        if exit_code.is_success() {
            if let Err(e) = self.repo.mark_completed(job.id.as_str(), exit_code, None) {
                tracing::warn!(job_id = %job.id, error = %e, "failed to persist MarkCompleted(success)");
            }
            return RunOutcome::Succeeded;
        }

        if retry::should_retry(&job.policy, job.retry_count, &exit_code) {
            let mut rng = thread_rng();
            let at = retry::retry_at(&job.policy, job.retry_count, self.clock.now_utc(), &mut rng);
            let message = format!("process exited with code {exit_code}");
            if let Err(e) =
                self.repo.schedule_retry(job.id.as_str(), at, Some(&exit_code), Some(&message))
            {
                tracing::warn!(job_id = %job.id, error = %e, "failed to persist ScheduleRetry");
            }
            return RunOutcome::Retried;
        }

        let message = format!("process exited with code {exit_code}");
        if let Err(e) = self.repo.mark_completed(job.id.as_str(), exit_code, Some(&message)) {
            tracing::warn!(job_id = %job.id, error = %e, "failed to persist MarkCompleted(failure)");
        }
        RunOutcome::Failed
    }
}

#[cfg(unix)]
fn exit_code_of(status: std::process::ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    match status.code() {
        Some(code) => ExitCode::Numeric(code),
        None => match status.signal() {
            Some(sig) => ExitCode::Symbolic(format!("signal_{sig}")),
            None => ExitCode::Symbolic("unknown".to_string()),
        },
    }
}

#[cfg(not(unix))]
fn exit_code_of(status: std::process::ExitStatus) -> ExitCode {
    match status.code() {
        Some(code) => ExitCode::Numeric(code),
        None => ExitCode::Symbolic("unknown".to_string()),
    }
}

fn open_append(path: &Path) -> io::Result<std::fs::File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn append_to(path: &Path, message: &str) -> io::Result<()> {
    use std::io::Write;
    let mut f = open_append(path)?;
    writeln!(f, "{message}")
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
