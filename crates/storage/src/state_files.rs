// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed read/write accessors for the per-job state fields (§4.2).
//!
//! Every accessor here is built on [`crate::fs::atomic_write`] /
//! [`crate::fs::atomic_clear`] / [`crate::fs::read_optional`] — reads
//! never fail on a missing file (they return `None`), writes are atomic,
//! and clearing a field deletes its file.

use crate::error::StorageError;
use crate::fs;
use barn_core::job::{ExitCode, JobState};
use barn_core::time_fmt::{format_instant, parse_instant};
use chrono::{DateTime, Utc};
use std::path::Path;

pub fn read_state(job_dir: &Path) -> Result<Option<JobState>, StorageError> {
    Ok(fs::read_optional(&fs::field_path(job_dir, "state"))?
        .and_then(|s| JobState::parse(&s)))
}

pub fn write_state(job_dir: &Path, state: JobState) -> Result<(), StorageError> {
    fs::atomic_write(&fs::field_path(job_dir, "state"), state.to_string().as_bytes())?;
    Ok(())
}

fn read_instant(job_dir: &Path, field: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
    match fs::read_optional(&fs::field_path(job_dir, field))? {
        Some(raw) => Ok(parse_instant(&raw).ok()),
        None => Ok(None),
    }
}

fn write_instant(job_dir: &Path, field: &str, at: DateTime<Utc>) -> Result<(), StorageError> {
    fs::atomic_write(&fs::field_path(job_dir, field), format_instant(at).as_bytes())?;
    Ok(())
}

fn clear_field(job_dir: &Path, field: &str) -> Result<(), StorageError> {
    fs::atomic_clear(&fs::field_path(job_dir, field))?;
    Ok(())
}

pub fn read_created_at(job_dir: &Path) -> Result<Option<DateTime<Utc>>, StorageError> {
    read_instant(job_dir, "created_at")
}

pub fn write_created_at(job_dir: &Path, at: DateTime<Utc>) -> Result<(), StorageError> {
    write_instant(job_dir, "created_at", at)
}

pub fn read_started_at(job_dir: &Path) -> Result<Option<DateTime<Utc>>, StorageError> {
    read_instant(job_dir, "started_at")
}

pub fn write_started_at(job_dir: &Path, at: DateTime<Utc>) -> Result<(), StorageError> {
    write_instant(job_dir, "started_at", at)
}

pub fn clear_started_at(job_dir: &Path) -> Result<(), StorageError> {
    clear_field(job_dir, "started_at")
}

pub fn read_finished_at(job_dir: &Path) -> Result<Option<DateTime<Utc>>, StorageError> {
    read_instant(job_dir, "finished_at")
}

pub fn write_finished_at(job_dir: &Path, at: DateTime<Utc>) -> Result<(), StorageError> {
    write_instant(job_dir, "finished_at", at)
}

pub fn clear_finished_at(job_dir: &Path) -> Result<(), StorageError> {
    clear_field(job_dir, "finished_at")
}

pub fn read_heartbeat(job_dir: &Path) -> Result<Option<DateTime<Utc>>, StorageError> {
    read_instant(job_dir, "heartbeat")
}

pub fn write_heartbeat(job_dir: &Path, at: DateTime<Utc>) -> Result<(), StorageError> {
    write_instant(job_dir, "heartbeat", at)
}

pub fn clear_heartbeat(job_dir: &Path) -> Result<(), StorageError> {
    clear_field(job_dir, "heartbeat")
}

pub fn read_retry_at(job_dir: &Path) -> Result<Option<DateTime<Utc>>, StorageError> {
    read_instant(job_dir, "retry_at")
}

pub fn write_retry_at(job_dir: &Path, at: DateTime<Utc>) -> Result<(), StorageError> {
    write_instant(job_dir, "retry_at", at)
}

pub fn clear_retry_at(job_dir: &Path) -> Result<(), StorageError> {
    clear_field(job_dir, "retry_at")
}

pub fn read_pid(job_dir: &Path) -> Result<Option<u64>, StorageError> {
    Ok(fs::read_optional(&fs::field_path(job_dir, "pid"))?
        .and_then(|s| s.trim().parse().ok()))
}

pub fn write_pid(job_dir: &Path, pid: u64) -> Result<(), StorageError> {
    fs::atomic_write(&fs::field_path(job_dir, "pid"), pid.to_string().as_bytes())?;
    Ok(())
}

pub fn clear_pid(job_dir: &Path) -> Result<(), StorageError> {
    clear_field(job_dir, "pid")
}

pub fn read_exit_code(job_dir: &Path) -> Result<Option<ExitCode>, StorageError> {
    Ok(fs::read_optional(&fs::field_path(job_dir, "exit_code"))?.map(|s| {
        let s = s.trim();
        match s.parse::<i32>() {
            Ok(n) => ExitCode::Numeric(n),
            Err(_) => ExitCode::Symbolic(s.to_string()),
        }
    }))
}

pub fn write_exit_code(job_dir: &Path, code: &ExitCode) -> Result<(), StorageError> {
    fs::atomic_write(&fs::field_path(job_dir, "exit_code"), code.to_string().as_bytes())?;
    Ok(())
}

pub fn clear_exit_code(job_dir: &Path) -> Result<(), StorageError> {
    clear_field(job_dir, "exit_code")
}

pub fn read_error(job_dir: &Path) -> Result<Option<String>, StorageError> {
    Ok(fs::read_optional(&fs::field_path(job_dir, "error"))?.map(|s| s.trim_end().to_string()))
}

pub fn write_error(job_dir: &Path, message: &str) -> Result<(), StorageError> {
    fs::atomic_write(&fs::field_path(job_dir, "error"), format!("{message}\n").as_bytes())?;
    Ok(())
}

pub fn clear_error(job_dir: &Path) -> Result<(), StorageError> {
    clear_field(job_dir, "error")
}

pub fn read_tag(job_dir: &Path) -> Result<Option<String>, StorageError> {
    Ok(fs::read_optional(&fs::field_path(job_dir, "tag"))?.map(|s| s.trim_end().to_string()))
}

pub fn write_tag(job_dir: &Path, tag: &str) -> Result<(), StorageError> {
    fs::atomic_write(&fs::field_path(job_dir, "tag"), format!("{tag}\n").as_bytes())?;
    Ok(())
}

pub fn read_retry_count(job_dir: &Path) -> Result<u32, StorageError> {
    Ok(fs::read_optional(&fs::field_path(job_dir, "retry_count"))?
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0))
}

pub fn write_retry_count(job_dir: &Path, count: u32) -> Result<(), StorageError> {
    fs::atomic_write(&fs::field_path(job_dir, "retry_count"), count.to_string().as_bytes())?;
    Ok(())
}

/// `retry_history` only ever exposes `append(line)` (§4.2) — no rewriting,
/// no clearing.
pub fn append_retry_history(job_dir: &Path, line: &str) -> Result<(), StorageError> {
    fs::append_line(&fs::field_path(job_dir, "retry_history"), line)?;
    Ok(())
}

pub fn read_retry_history(job_dir: &Path) -> Result<Vec<String>, StorageError> {
    Ok(fs::read_optional(&fs::field_path(job_dir, "retry_history"))?
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default())
}

/// Build the human-readable retry history line from §4.3:
/// `<ISO-8601 now>|attempt=<n>|exit_code=<c>|error=<sanitized>`.
pub fn format_retry_history_line(
    at: DateTime<Utc>,
    attempt: u32,
    exit_code: Option<&ExitCode>,
    error: Option<&str>,
) -> String {
    let exit_code = exit_code.map(ToString::to_string).unwrap_or_default();
    let sanitized_error = error.unwrap_or_default().replace(['\n', '\r'], " ").replace('|', ";");
    format!("{}|attempt={attempt}|exit_code={exit_code}|error={sanitized_error}", format_instant(at))
}

#[cfg(test)]
#[path = "state_files_tests.rs"]
mod tests;
