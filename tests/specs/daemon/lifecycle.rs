// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barn daemon start|stop|status` (§4.7, §4.14).

use crate::prelude::*;

#[test]
fn daemon_status_reports_not_running_then_running_then_stopped() {
    let project = Project::new();

    project.barn().args(&["daemon", "status"]).passes().stdout_has("not running");

    let _daemon = project.start_daemon();
    project.barn().args(&["daemon", "status"]).passes().stdout_has("is running (pid");

    project.barn().args(&["daemon", "stop"]).passes().stdout_has("barnd stopped");
    assert!(wait_for(WAIT_MAX_MS, || !project.socket_path().exists()));
    project.barn().args(&["daemon", "status"]).passes().stdout_has("not running");
}

#[test]
fn daemon_start_spawns_barnd_and_daemon_stop_tears_it_down() {
    let project = Project::new();

    project.barn().args(&["daemon", "start"]).passes().stdout_has("barnd started");
    assert!(project.socket_path().exists());

    // Starting again while already running is rejected, not silently
    // ignored or doubled up.
    project.barn().args(&["daemon", "start"]).fails().stderr_has("already running");

    project.barn().args(&["daemon", "stop"]).passes().stdout_has("barnd stopped");
    assert!(wait_for(WAIT_MAX_MS, || !project.socket_path().exists()));
}

#[test]
fn graceful_shutdown_clears_the_pid_file() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    let pid_file = project.base_dir().join("barnd.pid");
    assert!(pid_file.exists());

    project.barn().args(&["daemon", "stop"]).passes();
    assert!(wait_for(WAIT_MAX_MS, || !pid_file.exists()));
}
