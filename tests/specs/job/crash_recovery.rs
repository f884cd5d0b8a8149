// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §8 scenario 6 / L4: a hard-killed daemon leaves an orphaned RUNNING
//! job behind; the next startup's recovery pass resolves it.

use crate::prelude::*;

#[test]
fn orphaned_job_with_no_retries_becomes_killed_on_recovery() {
    let project = Project::new().with_stale_threshold_secs(1);
    let daemon = project.start_daemon();

    let out = project.barn().args(&["create", "--max-retries", "0", "--", "sleep", "60"]).passes();
    let id = out.stdout().trim().strip_prefix("Created job ").unwrap().to_string();

    assert!(wait_for(WAIT_MAX_MS, || describe_json(&project, &id)["state"] == "RUNNING"));

    daemon.kill();
    // Let the heartbeat go stale relative to the 1s threshold configured
    // above before the next startup runs recovery.
    std::thread::sleep(std::time::Duration::from_millis(1500));

    let _restarted = project.start_daemon();

    assert!(wait_for(WAIT_MAX_MS, || describe_json(&project, &id)["state"] == "KILLED"));
    let job = describe_json(&project, &id);
    assert!(job["error"].is_string());
    assert!(job["finished_at"].is_string());
}

#[test]
fn orphaned_job_with_retries_configured_is_requeued() {
    let project = Project::new().with_stale_threshold_secs(1);
    let daemon = project.start_daemon();

    let out = project.barn().args(&["create", "--max-retries", "3", "--", "sleep", "60"]).passes();
    let id = out.stdout().trim().strip_prefix("Created job ").unwrap().to_string();

    assert!(wait_for(WAIT_MAX_MS, || describe_json(&project, &id)["state"] == "RUNNING"));

    daemon.kill();
    std::thread::sleep(std::time::Duration::from_millis(1500));

    let _restarted = project.start_daemon();

    // The job is requeued with retry_count incremented; it then runs
    // again and this time completes normally (no process survives the
    // crash to orphan it twice).
    assert!(wait_for(WAIT_MAX_MS, || {
        let state = describe_json(&project, &id)["state"].as_str().unwrap().to_string();
        matches!(state.as_str(), "QUEUED" | "RUNNING" | "SUCCEEDED")
    }));

    assert!(describe_json(&project, &id)["retry_count"].as_u64().unwrap() >= 1);
}
