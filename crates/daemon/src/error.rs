// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle errors (§4.12).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("another barnd instance is already running against this base_dir")]
    AlreadyRunning,

    #[error("failed to bind IPC socket at {0}")]
    Bind(PathBuf, #[source] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] barn_storage::StorageError),
}
