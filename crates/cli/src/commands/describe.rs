// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barn describe` -- shows a single job's full snapshot (§6 `Describe`).

use barn_daemon::Config;
use barn_wire::{Request, Response};
use clap::Args;

use crate::exit_error::ExitError;
use crate::{commands, table};

#[derive(Args)]
pub struct DescribeArgs {
    /// Job id, e.g. `job-deadbeef`.
    id: String,
}

pub async fn run(config: &Config, args: DescribeArgs, json: bool) -> Result<(), ExitError> {
    let request = Request::Describe { id: args.id };
    match commands::client(config).send(request).await? {
        Response::Job { job } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&job).map_err(|e| ExitError::new(1, e.to_string()))?);
            } else {
                println!("{}", table::render_job_detail(&job));
            }
            Ok(())
        }
        Response::Err { error } => Err(commands::response_err(error)),
        other => Err(ExitError::new(1, format!("unexpected response: {other:?}"))),
    }
}
