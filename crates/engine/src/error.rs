// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds raised by the runner and scheduler (§7).

use barn_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to launch child process: {0}")]
    StartFailed(String),

    #[error("runner was interrupted while waiting for the child")]
    Interrupted,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("another scheduler already holds the lock for this base directory")]
    AlreadyRunning,

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for SchedulerError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::AlreadyRunning => SchedulerError::AlreadyRunning,
            other => SchedulerError::Storage(other),
        }
    }
}
