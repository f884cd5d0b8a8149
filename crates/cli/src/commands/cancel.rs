// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barn cancel` -- cancels a QUEUED or RUNNING job (§6 `Cancel`).

use barn_daemon::Config;
use barn_wire::{Request, Response};
use clap::Args;

use crate::commands;
use crate::exit_error::ExitError;

#[derive(Args)]
pub struct CancelArgs {
    /// Job id, e.g. `job-deadbeef`.
    id: String,
}

pub async fn run(config: &Config, args: CancelArgs) -> Result<(), ExitError> {
    let id = args.id.clone();
    match commands::client(config).send(Request::Cancel { id: args.id }).await? {
        Response::Ok => {
            println!("Canceled job {id}");
            Ok(())
        }
        Response::Err { error } => Err(commands::response_err(error)),
        other => Err(ExitError::new(1, format!("unexpected response: {other:?}"))),
    }
}
