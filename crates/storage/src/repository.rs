// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job repository (§4.3): owns all mutation of job state, enforcing the
//! state machine centrally before every write.

use crate::error::StorageError;
use crate::{fs, state_files};
use barn_core::job::{ExitCode, Job, JobState, Manifest, NewJob};
use barn_core::{Clock, JobId};
use std::path::{Path, PathBuf};

const MAX_ID_COLLISION_RETRIES: u32 = 8;

pub struct JobRepository<C: Clock> {
    base_dir: PathBuf,
    clock: C,
}

impl<C: Clock> JobRepository<C> {
    pub fn new(base_dir: impl Into<PathBuf>, clock: C) -> Self {
        Self { base_dir: base_dir.into(), clock }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn job_dir(&self, id: &str) -> PathBuf {
        fs::job_dir(&self.base_dir, id)
    }

    /// Generates an id, creates the job directory, writes the manifest,
    /// and writes the initial QUEUED state. Regenerates the id on a
    /// directory-already-exists collision, up to a bounded number of
    /// attempts (§3.1 — the probability is astronomically low).
    pub fn create(&self, new_job: NewJob) -> Result<Job, StorageError> {
        if new_job.command.is_empty() {
            return Err(StorageError::ConfigError("command must not be empty".into()));
        }
        new_job.policy.validate()?;

        let created_at = self.clock.now_utc();
        let mut last_err = None;
        for _ in 0..MAX_ID_COLLISION_RETRIES {
            let id = JobId::generate();
            let dir = self.job_dir(id.as_str());
            match std::fs::create_dir(&dir) {
                Ok(()) => {
                    let manifest = Manifest {
                        id,
                        command: new_job.command.clone(),
                        tag: new_job.tag.clone(),
                        created_at,
                        load_level: new_job.load_level,
                        max_retries: new_job.policy.max_retries,
                        retry_delay_seconds: new_job.policy.retry_delay_seconds,
                        retry_backoff_multiplier: new_job.policy.retry_backoff_multiplier,
                        retry_on_exit_codes: new_job.policy.retry_on_exit_codes.clone(),
                    };
                    self.write_manifest(&dir, &manifest)?;
                    state_files::write_state(&dir, JobState::Queued)?;
                    state_files::write_created_at(&dir, created_at)?;
                    state_files::write_retry_count(&dir, 0)?;
                    if let Some(tag) = &new_job.tag {
                        state_files::write_tag(&dir, tag)?;
                    }
                    return Ok(Job::from_manifest(&manifest));
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    last_err = Some(e);
                    continue;
                }
                Err(e) => return Err(StorageError::Io(e)),
            }
        }
        Err(StorageError::Io(last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "job id collision retries exhausted")
        })))
    }

    fn write_manifest(&self, dir: &Path, manifest: &Manifest) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(manifest)?;
        fs::atomic_write(&fs::manifest_path(dir), &json)?;
        Ok(())
    }

    fn read_manifest(&self, dir: &Path) -> Result<Option<Manifest>, StorageError> {
        match fs::read_optional(&fs::manifest_path(dir))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Reads manifest + state files and assembles a snapshot. Absent
    /// directory returns `Ok(None)`, never an error.
    pub fn find_by_id(&self, id: &str) -> Result<Option<Job>, StorageError> {
        let dir = self.job_dir(id);
        let manifest = match self.read_manifest(&dir)? {
            Some(m) => m,
            None => return Ok(None),
        };
        if manifest.id.as_str() != id {
            return Err(StorageError::Corrupt {
                dir_id: id.to_string(),
                manifest_id: manifest.id.as_str().to_string(),
            });
        }

        let state = state_files::read_state(&dir)?.unwrap_or(JobState::Queued);
        let created_at = state_files::read_created_at(&dir)?.unwrap_or(manifest.created_at);
        let started_at = state_files::read_started_at(&dir)?;
        let finished_at = state_files::read_finished_at(&dir)?;
        let heartbeat = state_files::read_heartbeat(&dir)?;
        let retry_at = state_files::read_retry_at(&dir)?;
        let pid = state_files::read_pid(&dir)?;
        let exit_code = state_files::read_exit_code(&dir)?;
        let error = state_files::read_error(&dir)?;
        let tag = state_files::read_tag(&dir)?.or_else(|| manifest.tag.clone());
        let retry_count = state_files::read_retry_count(&dir)?;
        let retry_history = state_files::read_retry_history(&dir)?;

        Ok(Some(Job {
            id: manifest.id,
            command: manifest.command.clone(),
            tag,
            load_level: manifest.load_level,
            state,
            created_at,
            started_at,
            finished_at,
            exit_code,
            error,
            pid,
            heartbeat,
            retry_count,
            retry_at,
            retry_history,
            policy: manifest.retry_policy(),
        }))
    }

    /// Enumerates `jobs/` subdirectories, skipping unreadable ones with a
    /// warning rather than failing the whole listing.
    pub fn find_all(&self) -> Result<Vec<Job>, StorageError> {
        let dir = fs::jobs_dir(&self.base_dir);
        let entries = match std::fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let mut jobs = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read jobs directory entry");
                    continue;
                }
            };
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!(path = ?entry.path(), "skipping job directory with non-UTF-8 name");
                continue;
            };
            match self.find_by_id(&name) {
                Ok(Some(job)) => jobs.push(job),
                Ok(None) => {}
                Err(e) => tracing::warn!(job_id = %name, error = %e, "skipping unreadable job"),
            }
        }
        Ok(jobs)
    }

    pub fn find_by_state(&self, state: JobState) -> Result<Vec<Job>, StorageError> {
        Ok(self.find_all()?.into_iter().filter(|j| j.state == state).collect())
    }

    fn transition(&self, id: &str, to: JobState) -> Result<Job, StorageError> {
        let dir = self.job_dir(id);
        let job = self
            .find_by_id(id)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        if !job.state.can_transition_to(to) {
            return Err(StorageError::InvalidTransition { id: id.to_string(), from: job.state, to });
        }
        state_files::write_state(&dir, to)?;
        Ok(job)
    }

    /// QUEUED → RUNNING; sets startedAt=heartbeat=now, pid.
    pub fn mark_started(&self, id: &str, pid: u64) -> Result<(), StorageError> {
        let dir = self.job_dir(id);
        self.transition(id, JobState::Running)?;
        let now = self.clock.now_utc();
        state_files::write_started_at(&dir, now)?;
        state_files::write_heartbeat(&dir, now)?;
        state_files::write_pid(&dir, pid)?;
        Ok(())
    }

    /// Writes heartbeat. No state change. No-op if the job is not
    /// currently RUNNING (the job may have been reconciled away under us).
    pub fn update_heartbeat(&self, id: &str) -> Result<(), StorageError> {
        let dir = self.job_dir(id);
        let Some(job) = self.find_by_id(id)? else {
            return Ok(());
        };
        if job.state != JobState::Running {
            return Ok(());
        }
        state_files::write_heartbeat(&dir, self.clock.now_utc())?;
        Ok(())
    }

    /// RUNNING → SUCCEEDED if exitCode=0, else RUNNING → FAILED.
    pub fn mark_completed(
        &self,
        id: &str,
        exit_code: ExitCode,
        error: Option<&str>,
    ) -> Result<(), StorageError> {
        let dir = self.job_dir(id);
        let to = if exit_code.is_success() { JobState::Succeeded } else { JobState::Failed };
        self.transition(id, to)?;
        state_files::write_finished_at(&dir, self.clock.now_utc())?;
        state_files::write_exit_code(&dir, &exit_code)?;
        if let Some(msg) = error {
            state_files::write_error(&dir, msg)?;
        }
        Ok(())
    }

    /// Transitions to FAILED with a symbolic exit code string
    /// (`start_failed`, `interrupted`, ...).
    pub fn mark_failed(&self, id: &str, symbolic: &str, error: &str) -> Result<(), StorageError> {
        self.mark_completed(id, ExitCode::Symbolic(symbolic.to_string()), Some(error))
    }

    /// RUNNING → KILLED. Used by crash recovery and the kill operation.
    pub fn mark_killed(&self, id: &str, error: &str) -> Result<(), StorageError> {
        let dir = self.job_dir(id);
        self.transition(id, JobState::Killed)?;
        state_files::write_finished_at(&dir, self.clock.now_utc())?;
        state_files::write_error(&dir, error)?;
        Ok(())
    }

    /// QUEUED or RUNNING → CANCELED.
    pub fn mark_canceled(&self, id: &str) -> Result<(), StorageError> {
        let dir = self.job_dir(id);
        self.transition(id, JobState::Canceled)?;
        state_files::write_finished_at(&dir, self.clock.now_utc())?;
        Ok(())
    }

    /// Appends a retry_history line for the previous attempt, increments
    /// retry_count, writes retryAt, clears startedAt/heartbeat/finishedAt,
    /// transitions the prior terminal/KILLED state → QUEUED.
    pub fn schedule_retry(
        &self,
        id: &str,
        retry_at: chrono::DateTime<chrono::Utc>,
        last_exit_code: Option<&ExitCode>,
        last_error: Option<&str>,
    ) -> Result<(), StorageError> {
        let dir = self.job_dir(id);
        let job = self.find_by_id(id)?.ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        if !job.state.can_transition_to(JobState::Queued) {
            return Err(StorageError::InvalidTransition {
                id: id.to_string(),
                from: job.state,
                to: JobState::Queued,
            });
        }

        let next_attempt = job.retry_count + 1;
        let line = state_files::format_retry_history_line(
            self.clock.now_utc(),
            next_attempt,
            last_exit_code,
            last_error,
        );
        state_files::append_retry_history(&dir, &line)?;
        state_files::write_retry_count(&dir, next_attempt)?;
        state_files::write_retry_at(&dir, retry_at)?;
        state_files::clear_started_at(&dir)?;
        state_files::clear_heartbeat(&dir)?;
        state_files::clear_finished_at(&dir)?;
        state_files::clear_pid(&dir)?;
        state_files::clear_exit_code(&dir)?;
        state_files::write_state(&dir, JobState::Queued)?;
        Ok(())
    }

    /// Removes the job directory recursively. Idempotent: a missing
    /// directory is not an error.
    pub fn delete(&self, id: &str) -> Result<(), StorageError> {
        let dir = self.job_dir(id);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
