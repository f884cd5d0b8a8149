// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barn clean` -- runs the cleanup reaper once (§6 `Clean`).

use barn_daemon::Config;
use barn_wire::{Request, Response};

use crate::exit_error::ExitError;
use crate::commands;

pub async fn run(config: &Config, json: bool) -> Result<(), ExitError> {
    match commands::client(config).send(Request::Clean).await? {
        Response::Cleaned { deleted } => {
            if json {
                println!("{}", serde_json::json!({ "deleted": deleted }));
            } else {
                println!("Deleted {deleted} job(s)");
            }
            Ok(())
        }
        Response::Err { error } => Err(commands::response_err(error)),
        other => Err(ExitError::new(1, format!("unexpected response: {other:?}"))),
    }
}
