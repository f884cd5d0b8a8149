// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barn list`/`barn status` rendering and filtering.

use crate::prelude::*;

#[test]
fn list_is_empty_before_any_job_is_created() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    project.barn().args(&["list"]).passes().stdout_has("No jobs found");
}

#[test]
fn list_shows_a_created_job_and_filters_by_state() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    let out = project.barn().args(&["create", "--max-retries", "0", "--", "echo", "hello"]).passes();
    let id = out.stdout().trim().strip_prefix("Created job ").unwrap().to_string();

    assert!(wait_for(WAIT_MAX_MS, || describe_json(&project, &id)["state"] == "SUCCEEDED"));

    project.barn().args(&["list", "--state", "succeeded"]).passes().stdout_has(&id);
    project.barn().args(&["list", "--state", "queued"]).passes().stdout_has("No jobs found");
}

#[test]
fn status_reports_the_configured_limits() {
    let project = Project::with_limits(LimitsConfig { max_high: 1, max_medium: 3, max_low: 9 });
    let _daemon = project.start_daemon();

    let out = project.barn().args(&["status"]).passes();
    let stdout = out.stdout();
    assert!(stdout.contains("0/1"), "stdout: {stdout}");
    assert!(stdout.contains("0/3"), "stdout: {stdout}");
    assert!(stdout.contains("0/9"), "stdout: {stdout}");
}
