// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Response DTOs mirroring the embedding contract of §6.

use barn_core::job::{ExitCode, Job, JobState, LoadLevel, LoadLimits};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A full job snapshot as sent over the wire. Structurally identical to
/// [`barn_core::job::Job`]; kept as its own type so the wire schema does
/// not silently change if the in-process struct grows internal-only
/// fields later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobView {
    pub id: String,
    pub command: Vec<String>,
    pub tag: Option<String>,
    pub load_level: LoadLevel,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub exit_code: Option<ExitCode>,
    pub error: Option<String>,
    pub pid: Option<u64>,
    pub heartbeat: Option<DateTime<Utc>>,
    pub retry_count: u32,
    pub retry_at: Option<DateTime<Utc>>,
    pub retry_history: Vec<String>,
}

impl From<&Job> for JobView {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.as_str().to_string(),
            command: job.command.clone(),
            tag: job.tag.clone(),
            load_level: job.load_level,
            state: job.state,
            created_at: job.created_at,
            started_at: job.started_at,
            finished_at: job.finished_at,
            exit_code: job.exit_code.clone(),
            error: job.error.clone(),
            pid: job.pid,
            heartbeat: job.heartbeat,
            retry_count: job.retry_count,
            retry_at: job.retry_at,
            retry_history: job.retry_history.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusView {
    pub running: bool,
    pub queued: usize,
    pub running_high: u32,
    pub running_medium: u32,
    pub running_low: u32,
    pub limits: LoadLimits,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorPayload {
    pub kind: String,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: kind.into(), message: message.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Ok,
    Job { job: JobView },
    Jobs { jobs: Vec<JobView> },
    Status { status: StatusView },
    Cleaned { deleted: usize },
    Err { error: ErrorPayload },
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
