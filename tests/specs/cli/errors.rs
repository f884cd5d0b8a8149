// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error-path specs for `barn` subcommands (§7): unreachable daemon,
//! unknown job id, double-cancel of a terminal job.

use crate::prelude::*;

#[test]
fn commands_fail_clearly_when_barnd_is_not_running() {
    let project = Project::new();
    // No start_daemon() call: the socket never exists.

    project.barn().args(&["list"]).fails().stderr_has("not running");
}

#[test]
fn describe_of_an_unknown_job_is_not_found() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    let result = project.barn().args(&["describe", "job-deadbeef"]).fails();
    assert_eq!(result.exit_code(), 3);
    result.stderr_has("not_found");
}

#[test]
fn canceling_an_already_terminal_job_is_rejected() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    let out = project.barn().args(&["create", "--max-retries", "0", "--", "echo", "hi"]).passes();
    let id = out.stdout().trim().strip_prefix("Created job ").unwrap().to_string();
    assert!(wait_for(WAIT_MAX_MS, || describe_json(&project, &id)["state"] == "SUCCEEDED"));

    let result = project.barn().args(&["cancel", &id]).fails();
    assert_eq!(result.exit_code(), 4);
}
