// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barn kill` -- terminates a RUNNING job's process tree (§6 `Kill`).

use barn_daemon::Config;
use barn_wire::{Request, Response};
use clap::Args;

use crate::commands;
use crate::exit_error::ExitError;

#[derive(Args)]
pub struct KillArgs {
    /// Job id, e.g. `job-deadbeef`.
    id: String,
}

pub async fn run(config: &Config, args: KillArgs) -> Result<(), ExitError> {
    let id = args.id.clone();
    match commands::client(config).send(Request::Kill { id: args.id }).await? {
        Response::Ok => {
            println!("Killed job {id}");
            Ok(())
        }
        Response::Err { error } => Err(commands::response_err(error)),
        other => Err(ExitError::new(1, format!("unexpected response: {other:?}"))),
    }
}
