// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §8 end-to-end scenarios 1-2: happy path and deterministic failure.

use crate::prelude::*;

#[test]
fn happy_echo_job_succeeds_and_captures_stdout() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    let out = project
        .barn()
        .args(&["create", "--tag", "t", "--load-level", "medium", "--max-retries", "0", "--", "echo", "hello"])
        .passes();
    let id = out.stdout().trim().strip_prefix("Created job ").unwrap().to_string();

    assert!(wait_for(WAIT_MAX_MS, || describe_json(&project, &id)["state"] == "SUCCEEDED"));

    let job = describe_json(&project, &id);
    assert_eq!(job["exit_code"], 0);
    assert!(job["finished_at"].is_string());
    assert_eq!(job["load_level"], "MEDIUM");

    assert!(stdout_log(&project, &id).contains("hello"));
}

#[test]
fn deterministic_failure_with_no_retries_reports_its_exit_code() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    let out = project.barn().args(&["create", "--max-retries", "0", "--", "sh", "-c", "exit 3"]).passes();
    let id = out.stdout().trim().strip_prefix("Created job ").unwrap().to_string();

    assert!(wait_for(WAIT_MAX_MS, || describe_json(&project, &id)["state"] == "FAILED"));

    let job = describe_json(&project, &id);
    assert_eq!(job["exit_code"], 3);
    assert_eq!(job["retry_count"], 0);
    assert!(job["finished_at"].is_string());
}

#[test]
fn running_job_has_pid_started_at_and_heartbeat() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    let out = project.barn().args(&["create", "--max-retries", "0", "--", "sleep", "2"]).passes();
    let id = out.stdout().trim().strip_prefix("Created job ").unwrap().to_string();

    assert!(wait_for(WAIT_MAX_MS, || describe_json(&project, &id)["state"] == "RUNNING"));

    let job = describe_json(&project, &id);
    assert!(job["pid"].is_number());
    assert!(job["started_at"].is_string());
    assert!(job["heartbeat"].is_string());

    assert!(wait_for(3000, || describe_json(&project, &id)["state"] == "SUCCEEDED"));
}
