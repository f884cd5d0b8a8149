// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the domain layer itself (not storage or process I/O).

use crate::job::JobState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: JobState, to: JobState },

    #[error("invalid job configuration: {0}")]
    ConfigError(String),
}
