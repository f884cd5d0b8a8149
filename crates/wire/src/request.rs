// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request DTOs mirroring the embedding contract of §6.

use barn_core::job::{JobState, LoadLevel, RetryPolicy};
use serde::{Deserialize, Serialize};

/// Everything `Create` needs from a caller; mirrors [`barn_core::job::NewJob`]
/// but kept separate so the wire schema can evolve independently of the
/// in-process type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewJobRequest {
    pub command: Vec<String>,
    #[serde(default)]
    pub tag: Option<String>,
    /// `None` means "let the daemon classify it".
    #[serde(default)]
    pub load_level: Option<LoadLevel>,
    #[serde(default)]
    pub policy: RetryPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op")]
pub enum Request {
    Create(NewJobRequest),
    Cancel { id: String },
    Kill { id: String },
    Describe { id: String },
    List {
        #[serde(default)]
        state: Option<JobState>,
    },
    Clean,
    Status,
    Reload,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
