// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and shutdown (§4.7 "Startup sequence" / "Shutdown").

use std::sync::Arc;
use std::time::Duration;

use barn_core::job::JobState;
use barn_core::{Clock, SystemClock};
use barn_engine::{recover, reap, Classifier, Runner, Scheduler, SchedulerConfig};
use barn_storage::{JobRepository, SchedulerLock};
use tokio::sync::oneshot;

use crate::config::Config;
use crate::error::LifecycleError;
use crate::handlers::Handlers;
use crate::server;

/// Everything kept alive for the process lifetime. Dropping `lock`
/// releases the single-writer guarantee (§5, invariant I6).
pub struct Daemon {
    pub config: Config,
    pub repo: Arc<JobRepository<SystemClock>>,
    pub scheduler: Arc<Scheduler<SystemClock>>,
    pub handlers: Arc<Handlers<SystemClock>>,
    lock: SchedulerLock,
}

impl Daemon {
    /// Runs the §4.7 startup sequence: acquire the lock, recover orphaned
    /// jobs from a prior crash, and wire up the scheduler. The reaper and
    /// IPC listener are started separately by [`Daemon::run`] so callers
    /// that only need recovery (e.g. tests) can stop here.
    pub async fn start(config: Config) -> Result<Self, LifecycleError> {
        std::fs::create_dir_all(&config.base_dir)?;
        let lock = SchedulerLock::acquire(&config.base_dir).map_err(|e| match e {
            barn_storage::StorageError::AlreadyRunning => LifecycleError::AlreadyRunning,
            other => other.into(),
        })?;

        let pid_file = barn_storage::fs::pid_file_path(&config.base_dir);
        barn_storage::fs::atomic_write(&pid_file, std::process::id().to_string().as_bytes())?;

        let clock = SystemClock;
        let repo = Arc::new(JobRepository::new(config.base_dir.clone(), clock));

        let report = recover(&repo, &clock, config.stale_heartbeat_threshold);
        tracing::info!(
            inspected = report.inspected,
            orphaned = report.orphaned,
            requeued = report.requeued,
            skipped_ambiguous = report.skipped_ambiguous,
            "crash recovery complete"
        );

        let classifier = Arc::new(
            Classifier::load(&config.base_dir).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to load load-level classifier lists, using empty lists");
                Classifier::from_lists("", "", "")
            }),
        );

        let runner = Arc::new(Runner::new(Arc::clone(&repo), clock, config.heartbeat_interval));
        let scheduler_config =
            SchedulerConfig { poll_interval: config.poll_interval, limits: config.limits };
        let scheduler = Arc::new(Scheduler::new(Arc::clone(&repo), runner, clock, scheduler_config));

        let handlers =
            Arc::new(Handlers::new(Arc::clone(&repo), clock, classifier, Arc::clone(&scheduler), config.clone()));

        Ok(Self { config, repo, scheduler, handlers, lock })
    }

    /// Runs the daemon until `shutdown` resolves: starts the poller, the
    /// periodic reaper, and the IPC listener, then on shutdown stops the
    /// poller and drains in-flight jobs up to `shutdown_timeout` before
    /// returning (§4.7 "Graceful").
    pub async fn run(self, shutdown: oneshot::Receiver<()>) -> Result<(), LifecycleError> {
        let (scheduler_shutdown_tx, scheduler_shutdown_rx) = oneshot::channel();
        let (server_shutdown_tx, server_shutdown_rx) = oneshot::channel();

        let scheduler = Arc::clone(&self.scheduler);
        let scheduler_task = tokio::spawn(async move { scheduler.run_until(scheduler_shutdown_rx).await });

        let reaper_task = spawn_reaper(Arc::clone(&self.repo), self.config.clone());

        let socket_path = self.config.socket_path.clone();
        let handlers = Arc::clone(&self.handlers);
        let server_task = tokio::spawn(async move { server::serve(&socket_path, handlers, server_shutdown_rx).await });

        tracing::info!(base_dir = %self.config.base_dir.display(), "barnd started");

        let _ = shutdown.await;
        tracing::info!("shutdown requested, stopping poller");

        let _ = scheduler_shutdown_tx.send(());
        let _ = scheduler_task.await;
        reaper_task.abort();

        self.drain(self.config.shutdown_timeout).await;

        let _ = server_shutdown_tx.send(());
        let _ = server_task.await;

        let _ = barn_storage::fs::atomic_clear(&barn_storage::fs::pid_file_path(&self.config.base_dir));

        tracing::info!("barnd stopped");
        Ok(())
    }

    /// Waits for every RUNNING job to leave that state, up to `timeout`.
    /// Jobs still running past the deadline are force-terminated.
    async fn drain(&self, timeout: Duration) {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let running = self.repo.find_by_state(JobState::Running).unwrap_or_default();
            if running.is_empty() {
                return;
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!(count = running.len(), "shutdown timeout elapsed, force-terminating jobs");
                for job in running {
                    if let Some(pid) = job.pid {
                        let _ = barn_engine::process::terminate_tree(pid, Duration::from_secs(5)).await;
                    }
                }
                return;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }
}

fn spawn_reaper(repo: Arc<JobRepository<SystemClock>>, config: Config) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.reaper_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let deleted = reap(&repo, &SystemClock, &config.reaper);
            if deleted > 0 {
                tracing::info!(deleted, "reaper sweep deleted terminal jobs");
            }
        }
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
