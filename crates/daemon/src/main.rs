// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `barnd` entry point: parses just enough of the command line to locate
//! an optional config file and decide whether to attach stderr logging,
//! then runs the daemon until interrupted.

use std::path::PathBuf;

use barn_daemon::{Config, Daemon};

fn main() -> std::process::ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let explicit_config = parse_config_flag(&args);
    let attached = !args.iter().any(|a| a == "--detach");

    let config = match Config::load(explicit_config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("barnd: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    let _log_guard = match barn_daemon::logging::init(&config.log_dir, attached) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("barnd: failed to initialize logging: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("barnd: failed to start the async runtime: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(config))
}

async fn run(config: Config) -> std::process::ExitCode {
    let daemon = match Daemon::start(config).await {
        Ok(daemon) => daemon,
        Err(e) => {
            tracing::error!(error = %e, "barnd failed to start");
            return std::process::ExitCode::FAILURE;
        }
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(());
    });

    match daemon.run(shutdown_rx).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "barnd exited with an error");
            std::process::ExitCode::FAILURE
        }
    }
}

fn parse_config_flag(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}
