// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barn logs` -- reads a job's stdout/stderr directly off disk. This is
//! the one command that bypasses the IPC transport entirely: logs live at
//! a well-known path under the shared base directory (§4.1), so there is
//! nothing the daemon needs to mediate.

use std::io::{Read, Seek, SeekFrom};
use std::time::Duration;

use barn_daemon::Config;
use clap::Args;

use crate::exit_error::ExitError;

#[derive(Args)]
pub struct LogsArgs {
    /// Job id, e.g. `job-deadbeef`.
    id: String,

    /// Show stderr instead of stdout.
    #[arg(long)]
    stderr: bool,

    /// Keep printing new output as it's written.
    #[arg(short, long)]
    follow: bool,
}

pub async fn run(config: &Config, args: LogsArgs) -> Result<(), ExitError> {
    let job_dir = barn_storage::fs::job_dir(&config.base_dir, &args.id);
    let log_path = if args.stderr {
        barn_storage::fs::stderr_log_path(&job_dir)
    } else {
        barn_storage::fs::stdout_log_path(&job_dir)
    };

    if !job_dir.is_dir() {
        return Err(ExitError::new(3, format!("not_found: {}", args.id)));
    }

    let mut offset = print_from_start(&log_path)?;

    if args.follow {
        loop {
            tokio::time::sleep(Duration::from_millis(500)).await;
            offset = print_from(&log_path, offset)?;
        }
    }
    Ok(())
}

fn print_from_start(path: &std::path::Path) -> Result<u64, ExitError> {
    print_from(path, 0)
}

fn print_from(path: &std::path::Path, offset: u64) -> Result<u64, ExitError> {
    let Ok(mut file) = std::fs::File::open(path) else {
        return Ok(offset);
    };
    let len = file.metadata().map_err(|e| ExitError::new(1, e.to_string()))?.len();
    if len <= offset {
        return Ok(offset);
    }
    file.seek(SeekFrom::Start(offset)).map_err(|e| ExitError::new(1, e.to_string()))?;
    let mut buf = String::new();
    file.read_to_string(&mut buf).map_err(|e| ExitError::new(1, e.to_string()))?;
    print!("{buf}");
    Ok(len)
}
