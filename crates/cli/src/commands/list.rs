// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barn list` -- lists jobs, optionally filtered by state (§6 `List`).

use barn_core::job::JobState;
use barn_daemon::Config;
use barn_wire::{Request, Response};
use clap::Args;

use crate::exit_error::ExitError;
use crate::{commands, table};

#[derive(Args)]
pub struct ListArgs {
    /// Only show jobs in this state.
    #[arg(long, value_parser = parse_state)]
    state: Option<JobState>,
}

fn parse_state(s: &str) -> Result<JobState, String> {
    JobState::parse(&s.to_uppercase()).ok_or_else(|| {
        format!("invalid state: {s} (expected QUEUED/RUNNING/SUCCEEDED/FAILED/CANCELED/KILLED)")
    })
}

pub async fn run(config: &Config, args: ListArgs, json: bool) -> Result<(), ExitError> {
    let request = Request::List { state: args.state };
    match commands::client(config).send(request).await? {
        Response::Jobs { jobs } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&jobs).map_err(|e| ExitError::new(1, e.to_string()))?);
            } else if jobs.is_empty() {
                println!("No jobs found");
            } else {
                println!("{}", table::render_job_list(&jobs));
            }
            Ok(())
        }
        Response::Err { error } => Err(commands::response_err(error)),
        other => Err(ExitError::new(1, format!("unexpected response: {other:?}"))),
    }
}
