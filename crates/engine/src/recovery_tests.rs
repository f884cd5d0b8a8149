// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use barn_core::job::{JobState, LoadLevel, NewJob, RetryPolicy};
use barn_core::FakeClock;

fn repo_with_running_job(policy: RetryPolicy) -> (tempfile::TempDir, JobRepository<FakeClock>, FakeClock, String) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let clock = FakeClock::new();
    let repo = JobRepository::new(tmp.path(), clock.clone());
    let job = repo
        .create(NewJob { command: vec!["true".into()], tag: None, load_level: LoadLevel::Low, policy })
        .expect("create");
    repo.mark_started(job.id.as_str(), std::process::id() as u64 + 1_000_000).expect("mark started");
    let id = job.id.as_str().to_string();
    (tmp, repo, clock, id)
}

#[test]
fn fresh_heartbeat_is_not_touched() {
    let (_tmp, repo, clock, id) = repo_with_running_job(RetryPolicy::default());
    let report = recover(&repo, &clock, Duration::from_secs(30));
    assert_eq!(report.orphaned, 0);
    let found = repo.find_by_id(&id).expect("find").expect("present");
    assert_eq!(found.state, JobState::Running);
}

#[test]
fn stale_heartbeat_with_dead_pid_is_orphaned_and_killed_without_retry() {
    let (_tmp, repo, clock, id) = repo_with_running_job(RetryPolicy { max_retries: 0, ..Default::default() });
    clock.advance(Duration::from_secs(31));

    let report = recover(&repo, &clock, Duration::from_secs(30));
    assert_eq!(report.orphaned, 1);
    assert_eq!(report.requeued, 0);

    let found = repo.find_by_id(&id).expect("find").expect("present");
    assert_eq!(found.state, JobState::Killed);
    assert!(found.error.is_some());
}

#[test]
fn heartbeat_exactly_at_threshold_is_not_stale() {
    let (_tmp, repo, clock, id) = repo_with_running_job(RetryPolicy::default());
    clock.advance(Duration::from_secs(30));
    let report = recover(&repo, &clock, Duration::from_secs(30));
    assert_eq!(report.orphaned, 0);
    let found = repo.find_by_id(&id).expect("find").expect("present");
    assert_eq!(found.state, JobState::Running);
}

#[test]
fn heartbeat_one_nanosecond_over_threshold_is_stale() {
    let (_tmp, repo, clock, id) = repo_with_running_job(RetryPolicy::default());
    clock.advance(Duration::from_secs(30) + Duration::from_nanos(1));
    let report = recover(&repo, &clock, Duration::from_secs(30));
    assert_eq!(report.orphaned, 1);
    let found = repo.find_by_id(&id).expect("find").expect("present");
    assert_eq!(found.state, JobState::Killed);
}

#[test]
fn heartbeat_one_nanosecond_under_threshold_is_not_stale() {
    let (_tmp, repo, clock, id) = repo_with_running_job(RetryPolicy::default());
    clock.advance(Duration::from_secs(30) - Duration::from_nanos(1));
    let report = recover(&repo, &clock, Duration::from_secs(30));
    assert_eq!(report.orphaned, 0);
    let found = repo.find_by_id(&id).expect("find").expect("present");
    assert_eq!(found.state, JobState::Running);
}

#[test]
fn orphan_with_retries_available_is_requeued() {
    let policy = RetryPolicy { max_retries: 2, retry_delay_seconds: 1, retry_backoff_multiplier: 1.0, retry_on_exit_codes: vec![] };
    let (_tmp, repo, clock, id) = repo_with_running_job(policy);
    clock.advance(Duration::from_secs(31));

    let report = recover(&repo, &clock, Duration::from_secs(30));
    assert_eq!(report.orphaned, 1);
    assert_eq!(report.requeued, 1);

    let found = repo.find_by_id(&id).expect("find").expect("present");
    assert_eq!(found.state, JobState::Queued);
    assert_eq!(found.retry_count, 1);
}

#[test]
fn missing_pid_with_stale_heartbeat_is_orphaned() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let clock = FakeClock::new();
    let repo = JobRepository::new(tmp.path(), clock.clone());
    let job = repo
        .create(NewJob {
            command: vec!["true".into()],
            tag: None,
            load_level: LoadLevel::Low,
            policy: RetryPolicy::default(),
        })
        .expect("create");
    // Transition straight to RUNNING without a pid by writing state only
    // (simulates a manifest/state file surviving a crash mid-MarkStarted).
    let dir = barn_storage::fs::job_dir(repo.base_dir(), job.id.as_str());
    barn_storage::state_files::write_state(&dir, JobState::Running).expect("write state");
    clock.advance(Duration::from_secs(60));

    let report = recover(&repo, &clock, Duration::from_secs(30));
    assert_eq!(report.orphaned, 1);
}

#[test]
fn live_pid_with_stale_heartbeat_is_skipped_as_ambiguous() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let clock = FakeClock::new();
    let repo = JobRepository::new(tmp.path(), clock.clone());
    let job = repo
        .create(NewJob {
            command: vec!["true".into()],
            tag: None,
            load_level: LoadLevel::Low,
            policy: RetryPolicy::default(),
        })
        .expect("create");
    repo.mark_started(job.id.as_str(), std::process::id() as u64).expect("mark started");
    clock.advance(Duration::from_secs(60));

    let report = recover(&repo, &clock, Duration::from_secs(30));
    assert_eq!(report.orphaned, 0);
    assert_eq!(report.skipped_ambiguous, 1);
    let found = repo.find_by_id(job.id.as_str()).expect("find").expect("present");
    assert_eq!(found.state, JobState::Running);
}
