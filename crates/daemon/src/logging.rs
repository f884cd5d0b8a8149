// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup (§4.11): a daily-rotating file under `<base_dir>/logs`
//! plus, when `attached` is set, a mirror to stderr for interactive
//! debugging. Level is controlled by `BARN_LOG`, falling back to
//! `RUST_LOG`, defaulting to `info`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::LifecycleError;

/// Returns the `WorkerGuard` for the non-blocking file writer; dropping it
/// flushes any buffered log lines, so the caller must keep it alive for
/// the process lifetime.
pub fn init(log_dir: &Path, attached: bool) -> Result<WorkerGuard, LifecycleError> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "daemon.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env("BARN_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking));

    if attached {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    } else {
        registry.init();
    }

    Ok(guard)
}
