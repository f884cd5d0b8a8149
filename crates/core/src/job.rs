// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job domain types and the durable state machine.

use crate::job_id::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a job. Mutated only by the repository, per the
/// transition table in [`JobState::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Killed,
}

crate::simple_display! {
    JobState {
        Queued => "QUEUED",
        Running => "RUNNING",
        Succeeded => "SUCCEEDED",
        Failed => "FAILED",
        Canceled => "CANCELED",
        Killed => "KILLED",
    }
}

impl JobState {
    /// Parse the one-word token stored in the `state` file.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "QUEUED" => Some(Self::Queued),
            "RUNNING" => Some(Self::Running),
            "SUCCEEDED" => Some(Self::Succeeded),
            "FAILED" => Some(Self::Failed),
            "CANCELED" => Some(Self::Canceled),
            "KILLED" => Some(Self::Killed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled | Self::Killed)
    }

    /// The static transition table from §4.3. Any pair not listed here is
    /// rejected with `JobError::InvalidTransition`.
    pub fn can_transition_to(self, to: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, to),
            (Queued, Running)
                | (Queued, Canceled)
                | (Queued, Failed)
                | (Running, Succeeded)
                | (Running, Failed)
                | (Running, Canceled)
                | (Running, Killed)
                | (Failed, Queued)
                | (Killed, Queued)
        )
    }
}

/// Static classification of a command's resource intensity. Controls
/// admission concurrency in the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadLevel {
    High,
    Medium,
    Low,
}

crate::simple_display! {
    LoadLevel {
        High => "HIGH",
        Medium => "MEDIUM",
        Low => "LOW",
    }
}

impl Default for LoadLevel {
    fn default() -> Self {
        Self::Medium
    }
}

impl LoadLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

/// A job's exit code: the integer the child returned, or a symbolic token
/// for outcomes that never produced one (`start_failed`, `interrupted`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExitCode {
    Numeric(i32),
    Symbolic(String),
}

impl ExitCode {
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Numeric(0))
    }

    pub fn numeric(&self) -> Option<i32> {
        match self {
            ExitCode::Numeric(n) => Some(*n),
            ExitCode::Symbolic(_) => None,
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitCode::Numeric(n) => write!(f, "{n}"),
            ExitCode::Symbolic(s) => write!(f, "{s}"),
        }
    }
}

/// Retry policy attached to a job at create time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_seconds")]
    pub retry_delay_seconds: u64,
    #[serde(default = "default_retry_backoff_multiplier")]
    pub retry_backoff_multiplier: f64,
    /// Empty means "retry any non-zero exit code".
    #[serde(default)]
    pub retry_on_exit_codes: Vec<i32>,
}

fn default_retry_delay_seconds() -> u64 {
    5
}

fn default_retry_backoff_multiplier() -> f64 {
    2.0
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            retry_delay_seconds: default_retry_delay_seconds(),
            retry_backoff_multiplier: default_retry_backoff_multiplier(),
            retry_on_exit_codes: Vec::new(),
        }
    }
}

impl RetryPolicy {
    /// ConfigError-worthy checks the repository runs before persisting a
    /// manifest: non-finite inputs would make `delay()` misbehave silently.
    pub fn validate(&self) -> Result<(), crate::error::JobError> {
        if self.retry_backoff_multiplier < 1.0 || !self.retry_backoff_multiplier.is_finite() {
            return Err(crate::error::JobError::ConfigError(format!(
                "retryBackoffMultiplier must be >= 1.0, got {}",
                self.retry_backoff_multiplier
            )));
        }
        Ok(())
    }
}

/// Load-level admission limits. Defaults per §3.1: 2/8/32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadLimits {
    pub max_high: u32,
    pub max_medium: u32,
    pub max_low: u32,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self { max_high: 2, max_medium: 8, max_low: 32 }
    }
}

impl LoadLimits {
    pub fn max_for(&self, level: LoadLevel) -> u32 {
        match level {
            LoadLevel::High => self.max_high,
            LoadLevel::Medium => self.max_medium,
            LoadLevel::Low => self.max_low,
        }
    }
}

/// The immutable subset captured at create time, persisted once as
/// `manifest.json` and never rewritten. `retry_on_exit_codes` is not named
/// in spec.md's literal manifest field list but is included here anyway:
/// without it, `shouldRetry` could not be recomputed for a job recovered
/// after a daemon restart (see DESIGN.md).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub id: JobId,
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "loadLevel")]
    pub load_level: LoadLevel,
    #[serde(rename = "maxRetries")]
    pub max_retries: u32,
    #[serde(rename = "retryDelaySeconds")]
    pub retry_delay_seconds: u64,
    #[serde(rename = "retryBackoffMultiplier")]
    pub retry_backoff_multiplier: f64,
    #[serde(rename = "retryOnExitCodes", default)]
    pub retry_on_exit_codes: Vec<i32>,
}

impl Manifest {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            retry_delay_seconds: self.retry_delay_seconds,
            retry_backoff_multiplier: self.retry_backoff_multiplier,
            retry_on_exit_codes: self.retry_on_exit_codes.clone(),
        }
    }
}

/// A request to create a new job. `load_level` is resolved by the caller
/// (the classifier lives in `barn-engine`, a layer above this crate) before
/// it reaches the repository, so storage never depends on the classifier.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub command: Vec<String>,
    pub tag: Option<String>,
    pub load_level: LoadLevel,
    pub policy: RetryPolicy,
}

/// A full job snapshot, combining the immutable manifest fields with
/// mutable runtime state. This is what `FindById`/`FindAll` return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
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
    pub policy: RetryPolicy,
}

impl Job {
    /// Build the fresh QUEUED snapshot for a just-written manifest (P1).
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            id: manifest.id,
            command: manifest.command.clone(),
            tag: manifest.tag.clone(),
            load_level: manifest.load_level,
            state: JobState::Queued,
            created_at: manifest.created_at,
            started_at: None,
            finished_at: None,
            exit_code: None,
            error: None,
            pid: None,
            heartbeat: None,
            retry_count: 0,
            retry_at: None,
            retry_history: Vec::new(),
            policy: manifest.retry_policy(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Job {
    /// Minimal builder for tests; fields not covered here default to the
    /// values a fresh `from_manifest` job would have.
    pub fn test_fixture(id: &str) -> Self {
        let manifest = Manifest {
            id: JobId::from_string(id),
            command: vec!["true".to_string()],
            tag: None,
            created_at: Utc::now(),
            load_level: LoadLevel::Medium,
            max_retries: 0,
            retry_delay_seconds: 5,
            retry_backoff_multiplier: 2.0,
            retry_on_exit_codes: Vec::new(),
        };
        Self::from_manifest(&manifest)
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
