// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barn` subcommand implementations. Each one opens a single IPC
//! connection, sends one request, prints the response, and returns.

pub mod cancel;
pub mod clean;
pub mod create;
pub mod daemon;
pub mod describe;
pub mod kill;
pub mod list;
pub mod logs;
pub mod status;

use barn_daemon::Config;

use crate::client::Client;
use crate::exit_error::ExitError;

pub(crate) fn client(config: &Config) -> Client {
    Client::new(config.socket_path.clone())
}

/// Render a [`barn_wire::ErrorPayload`] as an [`ExitError`], distinguishing
/// the caller-visible-but-not-fatal kinds (§7) from the rest.
pub(crate) fn response_err(error: barn_wire::ErrorPayload) -> ExitError {
    let code = match error.kind.as_str() {
        "not_found" => 3,
        "already_terminal" | "not_running" => 4,
        "invalid_argument" => 5,
        _ => 1,
    };
    ExitError::new(code, format!("{}: {}", error.kind, error.message))
}
