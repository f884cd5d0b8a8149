// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cleanup reaper (§4.9): periodically deletes old terminal jobs.

use barn_core::job::JobState;
use barn_core::Clock;
use barn_storage::JobRepository;
use chrono::Duration as ChronoDuration;

#[derive(Debug, Clone, Copy)]
pub struct ReaperConfig {
    pub enabled: bool,
    pub max_age_hours: u64,
    pub keep_failed_jobs: bool,
    pub keep_failed_jobs_hours: u64,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self { enabled: true, max_age_hours: 72, keep_failed_jobs: true, keep_failed_jobs_hours: 168 }
    }
}

/// Hours a terminal job in `state` must sit before the reaper considers
/// it for deletion. FAILED/KILLED jobs get `keep_failed_jobs_hours` when
/// `keep_failed_jobs` is set; otherwise they're eligible as soon as
/// they're terminal and have a `finishedAt` (retention of zero hours).
fn retention_hours(state: JobState, config: &ReaperConfig) -> Option<u64> {
    match state {
        JobState::Succeeded | JobState::Canceled => Some(config.max_age_hours),
        JobState::Failed | JobState::Killed => {
            Some(if config.keep_failed_jobs { config.keep_failed_jobs_hours } else { 0 })
        }
        JobState::Queued | JobState::Running => None,
    }
}

/// Runs one reaper sweep. Never deletes QUEUED or RUNNING jobs regardless
/// of age. A failure to delete one job is logged and does not abort the
/// rest of the sweep. Returns the number of jobs deleted.
pub fn sweep<C: Clock>(repo: &JobRepository<C>, clock: &C, config: &ReaperConfig) -> usize {
    if !config.enabled {
        return 0;
    }

    let jobs = match repo.find_all() {
        Ok(jobs) => jobs,
        Err(e) => {
            tracing::error!(error = %e, "reaper: failed to enumerate jobs");
            return 0;
        }
    };

    let now = clock.now_utc();
    let mut deleted = 0;
    for job in jobs {
        let Some(retention) = retention_hours(job.state, config) else { continue };
        let Some(finished_at) = job.finished_at else { continue };
        let age = now - finished_at;
        if age < ChronoDuration::hours(retention as i64) {
            continue;
        }

        match repo.delete(job.id.as_str()) {
            Ok(()) => {
                tracing::debug!(job_id = %job.id, state = %job.state, "reaper deleted job");
                deleted += 1;
            }
            Err(e) => tracing::warn!(job_id = %job.id, error = %e, "reaper failed to delete job"),
        }
    }

    tracing::info!(deleted, "reaper sweep complete");
    deleted
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
