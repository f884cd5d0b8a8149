// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier: `job-` followed by exactly 8 lowercase hex characters.

use crate::id::IdBuf;
use rand::RngCore;
use serde::{Deserialize, Serialize};

pub const PREFIX: &str = "job-";
const SUFFIX_LEN: usize = 8;

/// A job's identifier, generated from a CSPRNG at create time.
///
/// Unlike the multi-type `define_id!` IDs elsewhere, this format is fixed
/// width (`job-` + 8 hex chars, 12 bytes total) and generation is caller
/// driven so storage can retry on directory-already-exists collisions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(IdBuf);

impl JobId {
    /// Generate a new random id (4 CSPRNG bytes, hex-encoded).
    pub fn generate() -> Self {
        let mut bytes = [0u8; 4];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(IdBuf::new(&format!("{PREFIX}{}", hex::encode(bytes))))
    }

    /// Parse an existing id string (directory name, manifest field, CLI arg).
    pub fn from_string(s: impl AsRef<str>) -> Self {
        Self(IdBuf::new(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Validate the `job-[0-9a-f]{8}` shape, e.g. before trusting a
    /// directory name read back off disk.
    pub fn is_well_formed(s: &str) -> bool {
        match s.strip_prefix(PREFIX) {
            Some(suffix) => {
                suffix.len() == SUFFIX_LEN
                    && suffix.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JobId({:?})", self.as_str())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for JobId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl std::borrow::Borrow<str> for JobId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl std::ops::Deref for JobId {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
#[path = "job_id_tests.rs"]
mod tests;
