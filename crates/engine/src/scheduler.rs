// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler (§4.7): the single-writer poll loop that selects the next
//! runnable job under per-level admission limits and dispatches it to a
//! [`crate::runner::Runner`] on the worker pool.

use crate::runner::Runner;
use barn_core::job::{Job, JobState, LoadLevel, LoadLimits};
use barn_core::Clock;
use barn_storage::JobRepository;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Per-level in-memory running counts. Owned exclusively by the
/// scheduler; never persisted, never shared across processes.
#[derive(Default)]
pub struct LevelCounters {
    high: AtomicU32,
    medium: AtomicU32,
    low: AtomicU32,
}

impl LevelCounters {
    fn cell(&self, level: LoadLevel) -> &AtomicU32 {
        match level {
            LoadLevel::High => &self.high,
            LoadLevel::Medium => &self.medium,
            LoadLevel::Low => &self.low,
        }
    }

    pub fn get(&self, level: LoadLevel) -> u32 {
        self.cell(level).load(Ordering::SeqCst)
    }

    fn increment(&self, level: LoadLevel) {
        self.cell(level).fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self, level: LoadLevel) {
        self.cell(level).fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SchedulerStatus {
    pub running: bool,
    pub queued: usize,
    pub running_high: u32,
    pub running_medium: u32,
    pub running_low: u32,
    pub limits: LoadLimits,
}

/// Per-tick selection (§4.7 steps 1-4), factored out as a pure function of
/// a queued-job snapshot so the FIFO/capacity/retry-gating rules are
/// independently testable without running an actual scheduler loop.
///
/// Discards jobs whose `retryAt` is in the future or whose level is at
/// capacity, then picks the smallest `createdAt`, tie-broken by id
/// lexicographic order (§9 open question, resolved).
pub fn select_next<'a>(
    queued: &'a [Job],
    counters: &LevelCounters,
    limits: &LoadLimits,
    now: DateTime<Utc>,
) -> Option<&'a Job> {
    queued
        .iter()
        .filter(|j| j.retry_at.map(|at| at <= now).unwrap_or(true))
        .filter(|j| counters.get(j.load_level) < limits.max_for(j.load_level))
        .min_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.as_str().cmp(b.id.as_str())))
}

pub struct SchedulerConfig {
    pub poll_interval: Duration,
    pub limits: LoadLimits,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_secs(1), limits: LoadLimits::default() }
    }
}

pub struct Scheduler<C: Clock> {
    repo: Arc<JobRepository<C>>,
    runner: Arc<Runner<C>>,
    clock: C,
    config: SchedulerConfig,
    counters: Arc<LevelCounters>,
    running: Arc<std::sync::atomic::AtomicBool>,
}

impl<C: Clock + 'static> Scheduler<C> {
    pub fn new(repo: Arc<JobRepository<C>>, runner: Arc<Runner<C>>, clock: C, config: SchedulerConfig) -> Self {
        Self {
            repo,
            runner,
            clock,
            config,
            counters: Arc::new(LevelCounters::default()),
            running: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        let queued = self.repo.find_by_state(JobState::Queued).map(|v| v.len()).unwrap_or(0);
        SchedulerStatus {
            running: self.running.load(Ordering::SeqCst),
            queued,
            running_high: self.counters.get(LoadLevel::High),
            running_medium: self.counters.get(LoadLevel::Medium),
            running_low: self.counters.get(LoadLevel::Low),
            limits: self.config.limits,
        }
    }

    /// One iteration of the main loop (§4.7 steps 1-5): read queued jobs,
    /// select one candidate, and dispatch it if any are runnable.
    pub fn tick(&self) {
        let queued = match self.repo.find_by_state(JobState::Queued) {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!(error = %e, "scheduler: failed to list queued jobs, skipping tick");
                return;
            }
        };

        let Some(job) = select_next(&queued, &self.counters, &self.config.limits, self.clock.now_utc())
        else {
            return;
        };
        let job = job.clone();

        self.counters.increment(job.load_level);
        let runner = Arc::clone(&self.runner);
        let counters = Arc::clone(&self.counters);
        let level = job.load_level;
        tokio::spawn(async move {
            runner.run(&job).await;
            counters.decrement(level);
        });
    }

    /// Runs the poller until `shutdown` resolves. On resolution the loop
    /// simply stops submitting new work -- in-flight runner tasks are the
    /// caller's responsibility to await/cancel per the graceful/immediate
    /// shutdown modes in §4.7.
    pub async fn run_until(&self, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
        self.running.store(true, Ordering::SeqCst);
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick(),
                _ = &mut shutdown => break,
            }
        }
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
