// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crash recovery (§4.8): runs once at startup, before the poller, to
//! reconcile jobs persisted as RUNNING whose supervising process no
//! longer exists.

use crate::process;
use barn_core::job::JobState;
use barn_core::Clock;
use barn_storage::JobRepository;
use chrono::Duration as ChronoDuration;
use rand::thread_rng;
use std::time::Duration;

#[derive(Debug, Default, Clone, Copy)]
pub struct RecoveryReport {
    pub inspected: usize,
    pub orphaned: usize,
    pub requeued: usize,
    pub skipped_ambiguous: usize,
}

/// Sweeps every RUNNING job once. A job is orphaned if its heartbeat is
/// stale and either it has no pid or the pid belongs to no live process.
/// Orphaned jobs are marked KILLED, then re-queued if their retry policy
/// still permits another attempt.
pub fn recover<C: Clock>(
    repo: &JobRepository<C>,
    clock: &C,
    stale_threshold: Duration,
) -> RecoveryReport {
    let mut report = RecoveryReport::default();

    let running = match repo.find_by_state(JobState::Running) {
        Ok(jobs) => jobs,
        Err(e) => {
            tracing::error!(error = %e, "crash recovery: failed to list RUNNING jobs");
            return report;
        }
    };

    for job in running {
        report.inspected += 1;
        let now = clock.now_utc();
        let stale = match job.heartbeat {
            Some(hb) => now - hb > ChronoDuration::from_std(stale_threshold).unwrap_or_default(),
            None => true,
        };
        if !stale {
            continue;
        }

        let orphaned = match job.pid {
            None => true,
            Some(pid) => {
                if process::is_alive(pid) {
                    tracing::warn!(job_id = %job.id, pid, "RUNNING job's pid is alive but heartbeat is stale; skipping (ambiguous)");
                    report.skipped_ambiguous += 1;
                    false
                } else {
                    true
                }
            }
        };
        if !orphaned {
            continue;
        }

        report.orphaned += 1;
        tracing::warn!(job_id = %job.id, "marking orphaned RUNNING job as KILLED");
        if let Err(e) = repo.mark_killed(job.id.as_str(), "Process killed — daemon restarted") {
            tracing::error!(job_id = %job.id, error = %e, "crash recovery: failed to mark job KILLED");
            continue;
        }

        if job.policy.max_retries > 0 && job.retry_count < job.policy.max_retries {
            let mut rng = thread_rng();
            let at = crate::retry::retry_at(&job.policy, job.retry_count, now, &mut rng);
            match repo.schedule_retry(job.id.as_str(), at, None, Some("Process killed — daemon restarted")) {
                Ok(()) => report.requeued += 1,
                Err(e) => tracing::error!(job_id = %job.id, error = %e, "crash recovery: failed to schedule retry"),
            }
        }
    }

    tracing::info!(
        inspected = report.inspected,
        orphaned = report.orphaned,
        requeued = report.requeued,
        skipped_ambiguous = report.skipped_ambiguous,
        "crash recovery sweep complete"
    );
    report
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
