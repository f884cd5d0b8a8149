// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barn create` behavior that doesn't require a running scheduler tick:
//! argument validation, response shape, and the §8 P1 invariant.

use crate::prelude::*;

#[test]
fn create_prints_a_job_id_and_the_job_starts_queued() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    let out = project.barn().args(&["create", "--", "echo", "hello"]).passes();
    let stdout = out.stdout();
    assert!(stdout.starts_with("Created job job-"), "stdout: {stdout}");

    let id = stdout.trim().strip_prefix("Created job ").unwrap().to_string();
    let job = describe_json(&project, &id);
    assert_eq!(job["retry_count"], 0);
    assert!(job["pid"].is_null());
    assert!(job["started_at"].is_null());
    assert!(job["finished_at"].is_null());
}

#[test]
fn create_rejects_an_empty_command() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    // clap itself refuses zero trailing args (`num_args = 1..`), so this
    // never reaches the daemon's ConfigError path -- it's still the same
    // user-visible contract: no job is created.
    project.barn().args(&["create", "--"]).fails();
}

#[test]
fn create_rejects_an_invalid_retry_policy() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    project
        .barn()
        .args(&["create", "--max-retries", "0", "--retry-backoff-multiplier", "0.5", "--", "echo", "hi"])
        .fails()
        .stderr_has("invalid_argument");
}

#[test]
fn create_attaches_a_tag_and_load_level() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    let out = project.barn().args(&["create", "--tag", "nightly", "--load-level", "low", "--", "echo", "hi"]).passes();
    let id = out.stdout().trim().strip_prefix("Created job ").unwrap().to_string();

    let job = describe_json(&project, &id);
    assert_eq!(job["tag"], "nightly");
    assert_eq!(job["load_level"], "LOW");
}
