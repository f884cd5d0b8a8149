// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use barn_core::job::JobState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("another scheduler already holds the lock for this base directory")]
    AlreadyRunning,

    #[error("job {0} not found")]
    NotFound(String),

    #[error("invalid transition from {from} to {to} for job {id}")]
    InvalidTransition { id: String, from: JobState, to: JobState },

    #[error("manifest for job {dir_id} is corrupt: id field reads {manifest_id:?}")]
    Corrupt { dir_id: String, manifest_id: String },

    #[error("unknown load level {0:?}")]
    UnknownLoadLevel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error("invalid job configuration: {0}")]
    ConfigError(String),
}

impl From<barn_core::JobError> for StorageError {
    fn from(e: barn_core::JobError) -> Self {
        match e {
            barn_core::JobError::InvalidTransition { from, to } => {
                StorageError::InvalidTransition { id: String::new(), from, to }
            }
            barn_core::JobError::ConfigError(msg) => StorageError::ConfigError(msg),
        }
    }
}
