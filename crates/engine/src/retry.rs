// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry calculator (§4.5): pure functions over a job's retry policy.

use barn_core::job::{ExitCode, RetryPolicy};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;

/// Hard ceiling on any computed retry delay, regardless of policy.
pub const MAX_DELAY_SECONDS: f64 = 3600.0;

/// `shouldRetry(job)`: true iff `maxRetries > 0` and `retryCount <
/// maxRetries` and the exit code is defined, non-zero, and either
/// `retryOnExitCodes` is empty or contains it. A symbolic (signal/no exit
/// code) outcome is never retryable (§9 open question, resolved).
pub fn should_retry(policy: &RetryPolicy, retry_count: u32, exit_code: &ExitCode) -> bool {
    if policy.max_retries == 0 || retry_count >= policy.max_retries {
        return false;
    }
    let Some(code) = exit_code.numeric() else {
        return false;
    };
    if code == 0 {
        return false;
    }
    policy.retry_on_exit_codes.is_empty() || policy.retry_on_exit_codes.contains(&code)
}

/// `delay(retryCount)` without jitter: `base × multiplier^retryCount`,
/// clamped to [`MAX_DELAY_SECONDS`]. Deterministic, for tests and for the
/// jittered variant's base value.
pub fn delay_seconds_no_jitter(policy: &RetryPolicy, retry_count: u32) -> f64 {
    let raw = policy.retry_delay_seconds as f64 * policy.retry_backoff_multiplier.powi(retry_count as i32);
    raw.min(MAX_DELAY_SECONDS)
}

/// `delay(retryCount)` with a uniform jitter in [0.8, 1.2] applied after
/// the exponential-backoff computation, then clamped again (jitter could
/// push an already-clamped value over the ceiling).
pub fn delay_seconds_with_jitter(policy: &RetryPolicy, retry_count: u32, rng: &mut impl Rng) -> f64 {
    let base = delay_seconds_no_jitter(policy, retry_count);
    let jitter = rng.gen_range(0.8..=1.2);
    (base * jitter).min(MAX_DELAY_SECONDS)
}

/// `retryAt(job)` = now + delay(job.retryCount), jittered.
pub fn retry_at(
    policy: &RetryPolicy,
    retry_count: u32,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> DateTime<Utc> {
    let seconds = delay_seconds_with_jitter(policy, retry_count, rng);
    now + ChronoDuration::milliseconds((seconds * 1000.0) as i64)
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
