// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration loading (§4.10): an optional TOML file, resolved from an
//! explicit path, `BARN_CONFIG`, `<base_dir>/barn.toml`, or the platform
//! config directory, in that order. A missing file is not an error --
//! every field has a default matching spec.md.

use std::path::{Path, PathBuf};
use std::time::Duration;

use barn_core::job::{LoadLimits, RetryPolicy};
use barn_engine::ReaperConfig;
use serde::Deserialize;

use crate::error::LifecycleError;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    daemon: RawDaemon,
    limits: RawLimits,
    retry: RawRetry,
    reaper: RawReaper,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawDaemon {
    base_dir: Option<PathBuf>,
    poll_interval_ms: u64,
    shutdown_timeout_secs: u64,
    stale_heartbeat_threshold_secs: u64,
    heartbeat_interval_secs: u64,
}

impl Default for RawDaemon {
    fn default() -> Self {
        Self {
            base_dir: None,
            poll_interval_ms: 1000,
            shutdown_timeout_secs: 300,
            stale_heartbeat_threshold_secs: 30,
            heartbeat_interval_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawLimits {
    max_high: u32,
    max_medium: u32,
    max_low: u32,
}

impl Default for RawLimits {
    fn default() -> Self {
        let defaults = LoadLimits::default();
        Self { max_high: defaults.max_high, max_medium: defaults.max_medium, max_low: defaults.max_low }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawRetry {
    max_retries: u32,
    retry_delay_seconds: u64,
    retry_backoff_multiplier: f64,
}

impl Default for RawRetry {
    fn default() -> Self {
        let defaults = RetryPolicy::default();
        Self {
            max_retries: defaults.max_retries,
            retry_delay_seconds: defaults.retry_delay_seconds,
            retry_backoff_multiplier: defaults.retry_backoff_multiplier,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawReaper {
    enabled: bool,
    interval_minutes: u64,
    max_age_hours: u64,
    keep_failed_jobs: bool,
    keep_failed_jobs_hours: u64,
}

impl Default for RawReaper {
    fn default() -> Self {
        let defaults = ReaperConfig::default();
        Self {
            enabled: defaults.enabled,
            interval_minutes: 60,
            max_age_hours: defaults.max_age_hours,
            keep_failed_jobs: defaults.keep_failed_jobs,
            keep_failed_jobs_hours: defaults.keep_failed_jobs_hours,
        }
    }
}

/// Fully resolved configuration, with every path and duration already
/// computed so the rest of the daemon never has to know about TOML or
/// search-path fallbacks.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_dir: PathBuf,
    pub socket_path: PathBuf,
    pub log_dir: PathBuf,
    pub poll_interval: Duration,
    pub shutdown_timeout: Duration,
    pub stale_heartbeat_threshold: Duration,
    pub heartbeat_interval: Duration,
    pub limits: LoadLimits,
    pub default_retry_policy: RetryPolicy,
    pub reaper: ReaperConfig,
    pub reaper_interval: Duration,
}

impl Config {
    /// Loads configuration honoring the §4.10 search order. `explicit`
    /// corresponds to a `--config` CLI flag; it takes precedence over
    /// `BARN_CONFIG`.
    pub fn load(explicit: Option<&Path>) -> Result<Self, LifecycleError> {
        let raw = match Self::find_config_path(explicit) {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .map_err(|e| LifecycleError::Config(format!("reading {}: {e}", path.display())))?;
                toml::from_str::<RawConfig>(&text)
                    .map_err(|e| LifecycleError::Config(format!("parsing {}: {e}", path.display())))?
            }
            None => RawConfig::default(),
        };
        Self::finish(raw)
    }

    fn finish(raw: RawConfig) -> Result<Self, LifecycleError> {

        let base_dir = raw
            .daemon
            .base_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("barn")))
            .ok_or_else(|| LifecycleError::Config("could not determine a default base_dir".to_string()))?;

        Ok(Self {
            socket_path: base_dir.join("barn.sock"),
            log_dir: base_dir.join("logs"),
            base_dir,
            poll_interval: Duration::from_millis(raw.daemon.poll_interval_ms),
            shutdown_timeout: Duration::from_secs(raw.daemon.shutdown_timeout_secs),
            stale_heartbeat_threshold: Duration::from_secs(raw.daemon.stale_heartbeat_threshold_secs),
            heartbeat_interval: Duration::from_secs(raw.daemon.heartbeat_interval_secs),
            limits: LoadLimits {
                max_high: raw.limits.max_high,
                max_medium: raw.limits.max_medium,
                max_low: raw.limits.max_low,
            },
            default_retry_policy: RetryPolicy {
                max_retries: raw.retry.max_retries,
                retry_delay_seconds: raw.retry.retry_delay_seconds,
                retry_backoff_multiplier: raw.retry.retry_backoff_multiplier,
                retry_on_exit_codes: Vec::new(),
            },
            reaper: ReaperConfig {
                enabled: raw.reaper.enabled,
                max_age_hours: raw.reaper.max_age_hours,
                keep_failed_jobs: raw.reaper.keep_failed_jobs,
                keep_failed_jobs_hours: raw.reaper.keep_failed_jobs_hours,
            },
            reaper_interval: Duration::from_secs(raw.reaper.interval_minutes.saturating_mul(60)),
        })
    }

    /// Search order per §4.10: an explicit `--config` path (if given) wins
    /// outright -- it is not required to exist, a missing explicit path is
    /// an error rather than a silent fallback. Otherwise the first of
    /// `BARN_CONFIG`, `<default base_dir>/barn.toml`, or
    /// `dirs::config_dir()/barn/barn.toml` that actually exists on disk is
    /// used; if none exist, defaults apply.
    fn find_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var("BARN_CONFIG") {
            return Some(PathBuf::from(path));
        }
        let mut candidates = Vec::new();
        if let Some(data_dir) = dirs::data_dir() {
            candidates.push(data_dir.join("barn").join("barn.toml"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("barn").join("barn.toml"));
        }
        candidates.into_iter().find(|p| p.is_file())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
