// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §8 scenarios 3-4: retry count, retry_history, exponential backoff
//! timing (L2), and the exit-code filter.

use std::time::{Duration, Instant};

use crate::prelude::*;

#[test]
fn failing_job_retries_twice_then_fails_with_history() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    let start = Instant::now();
    let out = project
        .barn()
        .args(&[
            "create",
            "--max-retries",
            "2",
            "--retry-delay-seconds",
            "1",
            "--retry-backoff-multiplier",
            "2.0",
            "--",
            "sh",
            "-c",
            "exit 1",
        ])
        .passes();
    let id = out.stdout().trim().strip_prefix("Created job ").unwrap().to_string();

    assert!(wait_for(10_000, || describe_json(&project, &id)["state"] == "FAILED"));
    let elapsed = start.elapsed();

    let job = describe_json(&project, &id);
    assert_eq!(job["exit_code"], 1);
    assert_eq!(job["retry_count"], 2);
    assert_eq!(job["retry_history"].as_array().unwrap().len(), 2);

    // base=1s, multiplier=2.0: delays before attempt 2 and attempt 3 are
    // 1s and 2s, so the third attempt can't begin before t=3s (L2, ignoring
    // jitter, §8 scenario 3).
    assert!(elapsed >= Duration::from_secs(3), "elapsed was only {elapsed:?}");
}

#[test]
fn retry_on_exit_codes_filters_which_failures_retry() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    let no_retry = project
        .barn()
        .args(&[
            "create",
            "--max-retries",
            "2",
            "--retry-delay-seconds",
            "1",
            "--retry-on-exit-codes",
            "7",
            "--",
            "sh",
            "-c",
            "exit 3",
        ])
        .passes();
    let no_retry_id = no_retry.stdout().trim().strip_prefix("Created job ").unwrap().to_string();

    let retries = project
        .barn()
        .args(&[
            "create",
            "--max-retries",
            "2",
            "--retry-delay-seconds",
            "1",
            "--retry-on-exit-codes",
            "7",
            "--",
            "sh",
            "-c",
            "exit 7",
        ])
        .passes();
    let retries_id = retries.stdout().trim().strip_prefix("Created job ").unwrap().to_string();

    assert!(wait_for(10_000, || describe_json(&project, &no_retry_id)["state"] == "FAILED"));
    assert_eq!(describe_json(&project, &no_retry_id)["retry_count"], 0);

    assert!(wait_for(10_000, || describe_json(&project, &retries_id)["state"] == "FAILED"));
    assert_eq!(describe_json(&project, &retries_id)["retry_count"], 2);
}
