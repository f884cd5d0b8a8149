// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory layout and atomic single-value file writes (§4.1).

use crate::error::StorageError;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub fn jobs_dir(base_dir: &Path) -> PathBuf {
    base_dir.join("jobs")
}

pub fn job_dir(base_dir: &Path, id: &str) -> PathBuf {
    jobs_dir(base_dir).join(id)
}

pub fn work_dir(job_dir: &Path) -> PathBuf {
    job_dir.join("work")
}

pub fn logs_dir(job_dir: &Path) -> PathBuf {
    job_dir.join("logs")
}

pub fn stdout_log_path(job_dir: &Path) -> PathBuf {
    logs_dir(job_dir).join("stdout.log")
}

pub fn stderr_log_path(job_dir: &Path) -> PathBuf {
    logs_dir(job_dir).join("stderr.log")
}

pub fn manifest_path(job_dir: &Path) -> PathBuf {
    job_dir.join("manifest.json")
}

pub fn field_path(job_dir: &Path, field: &str) -> PathBuf {
    job_dir.join(field)
}

pub fn scheduler_lock_path(base_dir: &Path) -> PathBuf {
    base_dir.join("scheduler.lock")
}

/// Where `barnd` records its own pid so `barn daemon stop`/`status` can
/// find it without going through the IPC transport (the wire protocol has
/// no `Stop` request -- shutdown is a signal, per §4.7).
pub fn pid_file_path(base_dir: &Path) -> PathBuf {
    base_dir.join("barnd.pid")
}

/// Write `contents` to `path` atomically: write to a sibling temp file,
/// flush+fsync, rename over the target, fsync the directory. Readers can
/// never observe a partially written file — they see either the old
/// contents or the new ones.
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent directory"))?;
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::Builder::new().prefix(".tmp-").tempfile_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    sync_dir(dir)?;
    Ok(())
}

/// Delete `path` if present. Missing files are not an error — clearing an
/// already-absent field is a no-op (§4.2).
pub fn atomic_clear(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            if let Some(dir) = path.parent() {
                sync_dir(dir)?;
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Read a small state file's contents. Missing file means "absent", never
/// an error (§4.2).
pub fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Open a file in append mode, creating parent directories as needed.
/// Used for `retry_history` and the stdout/stderr logs — single-writer
/// per file, durable flush required between lines the caller wants to
/// survive a crash.
pub fn open_append(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

pub fn append_line(path: &Path, line: &str) -> io::Result<()> {
    let mut file = open_append(path)?;
    writeln!(file, "{line}")?;
    file.sync_all()
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    // Directory handles can't be fsynced portably on Windows; the rename
    // itself is already atomic at the filesystem level there.
    Ok(())
}

/// A held exclusive advisory lock on `scheduler.lock`, released when
/// dropped (or when the process exits). Acquisition is non-blocking: a
/// second scheduler against the same base directory fails immediately
/// rather than waiting.
pub struct SchedulerLock {
    _file: File,
}

impl SchedulerLock {
    pub fn acquire(base_dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(base_dir)?;
        let path = scheduler_lock_path(base_dir);
        let file = OpenOptions::new().create(true).write(true).open(&path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self { _file: file }),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(StorageError::AlreadyRunning),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
