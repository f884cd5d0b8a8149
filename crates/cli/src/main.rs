// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barn`: thin command-line client for `barnd` (§4.14). Every command is
//! a one-shot connect, send one [`barn_wire::Request`], print the
//! [`barn_wire::Response`], exit -- no retries, no local state beyond
//! config resolution.

mod client;
mod color;
mod commands;
mod exit_error;
mod table;

use std::path::PathBuf;

use barn_daemon::Config;
use clap::{Parser, Subcommand};
use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "barn", about = "Run and supervise external commands as durable jobs", styles = color::styles())]
struct Cli {
    /// Path to an explicit barn.toml (overrides BARN_CONFIG and the
    /// platform search path).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of a formatted table.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new job from a command.
    Create(commands::create::CreateArgs),
    /// List jobs, optionally filtered by state.
    List(commands::list::ListArgs),
    /// Show a single job's full state.
    Describe(commands::describe::DescribeArgs),
    /// Cancel a queued or running job.
    Cancel(commands::cancel::CancelArgs),
    /// Kill a running job's process tree.
    Kill(commands::kill::KillArgs),
    /// Show scheduler status: per-level running counts and limits.
    Status,
    /// Delete old terminal jobs per the retention policy.
    Clean,
    /// Show a job's stdout/stderr log.
    Logs(commands::logs::LogsArgs),
    /// Manage the `barnd` daemon process.
    #[command(subcommand)]
    Daemon(commands::daemon::DaemonCommand),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("barn: failed to start the async runtime: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("barn: {e}");
            std::process::ExitCode::from(e.code.clamp(0, 255) as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let config = Config::load(cli.config.as_deref())
        .map_err(|e| ExitError::new(1, format!("loading configuration: {e}")))?;

    match cli.command {
        Commands::Create(args) => commands::create::run(&config, args, cli.json).await,
        Commands::List(args) => commands::list::run(&config, args, cli.json).await,
        Commands::Describe(args) => commands::describe::run(&config, args, cli.json).await,
        Commands::Cancel(args) => commands::cancel::run(&config, args).await,
        Commands::Kill(args) => commands::kill::run(&config, args).await,
        Commands::Status => commands::status::run(&config, cli.json).await,
        Commands::Clean => commands::clean::run(&config, cli.json).await,
        Commands::Logs(args) => commands::logs::run(&config, args).await,
        Commands::Daemon(cmd) => commands::daemon::run(&config, cmd).await,
    }
}
