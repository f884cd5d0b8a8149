// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barn status` -- per-level running counts, limits, queued count (§6
//! `Status`).

use barn_daemon::Config;
use barn_wire::{Request, Response};

use crate::exit_error::ExitError;
use crate::{commands, table};

pub async fn run(config: &Config, json: bool) -> Result<(), ExitError> {
    match commands::client(config).send(Request::Status).await? {
        Response::Status { status } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&status).map_err(|e| ExitError::new(1, e.to_string()))?);
            } else {
                println!("{}", table::render_status(&status));
            }
            Ok(())
        }
        Response::Err { error } => Err(commands::response_err(error)),
        other => Err(ExitError::new(1, format!("unexpected response: {other:?}"))),
    }
}
