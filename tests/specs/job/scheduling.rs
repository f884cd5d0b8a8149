// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §8 scenario 5: per-load-level isolation. A slow HIGH job never blocks
//! LOW jobs from running and completing concurrently.

use crate::prelude::*;

#[test]
fn low_jobs_complete_while_a_high_job_is_still_running() {
    let project = Project::with_limits(LimitsConfig { max_high: 1, max_medium: 1, max_low: 4 });
    let _daemon = project.start_daemon();

    let high = project.barn().args(&["create", "--load-level", "high", "--max-retries", "0", "--", "sleep", "3"]).passes();
    let high_id = high.stdout().trim().strip_prefix("Created job ").unwrap().to_string();

    let low_ids: Vec<String> = (0..4)
        .map(|_| {
            let out =
                project.barn().args(&["create", "--load-level", "low", "--max-retries", "0", "--", "echo", "hi"]).passes();
            out.stdout().trim().strip_prefix("Created job ").unwrap().to_string()
        })
        .collect();

    assert!(wait_for(WAIT_MAX_MS, || low_ids.iter().all(|id| describe_json(&project, id)["state"] == "SUCCEEDED")));

    // The HIGH job must still be running (or just finishing) -- it was
    // never on the critical path for the LOW jobs.
    let high_state = describe_json(&project, &high_id)["state"].as_str().unwrap().to_string();
    assert!(
        high_state == "RUNNING" || high_state == "SUCCEEDED",
        "unexpected high job state: {high_state}"
    );

    assert!(wait_for(5000, || describe_json(&project, &high_id)["state"] == "SUCCEEDED"));
}

#[test]
fn at_most_one_medium_job_is_ever_observed_running_when_the_limit_is_one() {
    let project = Project::with_limits(LimitsConfig { max_high: 2, max_medium: 1, max_low: 2 });
    let _daemon = project.start_daemon();

    let ids: Vec<String> = (0..3)
        .map(|_| {
            let out = project
                .barn()
                .args(&["create", "--load-level", "medium", "--max-retries", "0", "--", "sleep", "1"])
                .passes();
            out.stdout().trim().strip_prefix("Created job ").unwrap().to_string()
        })
        .collect();

    let mut observed_concurrent = false;
    let deadline = std::time::Instant::now() + std::time::Duration::from_millis(4000);
    while std::time::Instant::now() < deadline {
        let running = ids.iter().filter(|id| describe_json(&project, id)["state"] == "RUNNING").count();
        assert!(running <= 1, "observed {running} MEDIUM jobs RUNNING at once, limit is 1");
        if running == 1 {
            observed_concurrent = true;
        }
        if ids.iter().all(|id| describe_json(&project, id)["state"] == "SUCCEEDED") {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(20));
    }
    assert!(observed_concurrent, "never observed a MEDIUM job running at all");
}
