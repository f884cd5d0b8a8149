// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ISO-8601 timestamp formatting and parsing for persisted instants.
//!
//! Writers always emit nanosecond precision; readers accept second,
//! millisecond, microsecond, or nanosecond precision, per §6.

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid ISO-8601 timestamp: {0:?}")]
pub struct TimestampParseError(String);

/// Format an instant as ISO-8601 UTC with nanosecond precision, e.g.
/// `2026-07-26T12:00:00.123456789Z`.
pub fn format_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse an ISO-8601 UTC instant at any of the four accepted precisions.
/// `chrono`'s RFC3339 parser already handles fractional seconds of any
/// length, including none.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, TimestampParseError> {
    let trimmed = s.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| TimestampParseError(trimmed.to_string()))
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
