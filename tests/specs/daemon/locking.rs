// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! P8: the scheduler lock is mutually exclusive.

use std::process::Stdio;

use crate::prelude::*;

#[test]
fn a_second_barnd_against_the_same_base_dir_fails_to_start() {
    let project = Project::new();
    let _daemon = project.start_daemon();

    // A second `barnd` pointed at the same config must fail outright
    // rather than silently taking over -- it should exit non-zero and
    // leave the first daemon's socket untouched. The lock is checked
    // before anything that would block, so this returns immediately.
    let status = std::process::Command::new(barnd_binary())
        .arg("--config")
        .arg(project.config_path())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("second barnd should at least spawn");

    assert!(!status.success(), "a second barnd against the same base_dir should fail to start");
    assert!(project.socket_path().exists(), "the first daemon's socket should be unaffected");
}
