// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barn create` -- submits a new job (§6 `Create`).

use barn_core::job::{LoadLevel, RetryPolicy};
use barn_daemon::Config;
use barn_wire::{JobView, NewJobRequest, Request, Response};
use clap::Args;

use crate::commands;
use crate::exit_error::ExitError;

#[derive(Args)]
pub struct CreateArgs {
    /// Explicit load level; omit to let the daemon classify the command.
    #[arg(long, value_parser = parse_load_level)]
    load_level: Option<LoadLevel>,

    /// Free-form user tag attached to the job.
    #[arg(long)]
    tag: Option<String>,

    /// Number of retries on failure (0 disables retries).
    #[arg(long, default_value_t = 0)]
    max_retries: u32,

    /// Base delay before the first retry, in seconds.
    #[arg(long, default_value_t = 5)]
    retry_delay_seconds: u64,

    /// Exponential backoff multiplier applied per retry (>= 1.0).
    #[arg(long, default_value_t = 2.0)]
    retry_backoff_multiplier: f64,

    /// Only retry if the exit code is one of these (comma-separated).
    /// Empty means "retry any non-zero exit code".
    #[arg(long, value_delimiter = ',')]
    retry_on_exit_codes: Vec<i32>,

    /// The command to run, e.g. `barn create -- echo hello`.
    #[arg(required = true, num_args = 1.., last = true)]
    command: Vec<String>,
}

fn parse_load_level(s: &str) -> Result<LoadLevel, String> {
    LoadLevel::parse(&s.to_uppercase()).ok_or_else(|| format!("invalid load level: {s} (expected HIGH/MEDIUM/LOW)"))
}

pub async fn run(config: &Config, args: CreateArgs, json: bool) -> Result<(), ExitError> {
    let policy = RetryPolicy {
        max_retries: args.max_retries,
        retry_delay_seconds: args.retry_delay_seconds,
        retry_backoff_multiplier: args.retry_backoff_multiplier,
        retry_on_exit_codes: args.retry_on_exit_codes,
    };
    policy.validate().map_err(|e| ExitError::new(5, e.to_string()))?;

    let request = Request::Create(NewJobRequest {
        command: args.command,
        tag: args.tag,
        load_level: args.load_level,
        policy,
    });

    match commands::client(config).send(request).await? {
        Response::Job { job } => print_job(&job, json),
        Response::Err { error } => Err(commands::response_err(error)),
        other => Err(ExitError::new(1, format!("unexpected response: {other:?}"))),
    }
}

fn print_job(job: &JobView, json: bool) -> Result<(), ExitError> {
    if json {
        println!("{}", serde_json::to_string_pretty(job).map_err(|e| ExitError::new(1, e.to_string()))?);
    } else {
        println!("Created job {}", job.id);
    }
    Ok(())
}
