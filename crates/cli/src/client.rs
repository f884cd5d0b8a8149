// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot IPC client: connect, send a single [`Request`], read the
//! [`Response`], disconnect (§4.13, §4.14). Every `barn` invocation opens
//! exactly one connection -- there is no persistent client state.

use std::path::{Path, PathBuf};

use barn_wire::{read_message, write_message, Request, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("barnd is not running (no socket at {0})")]
    NotRunning(PathBuf),

    #[error(transparent)]
    Framing(#[from] barn_wire::FramingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub struct Client {
    socket_path: PathBuf,
}

impl Client {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    pub async fn send(&self, request: Request) -> Result<Response, ClientError> {
        let mut stream = self.connect().await?;
        write_message(&mut stream, &request).await?;
        let response = read_message(&mut stream).await?;
        Ok(response)
    }

    #[cfg(unix)]
    async fn connect(&self) -> Result<tokio::net::UnixStream, ClientError> {
        tokio::net::UnixStream::connect(&self.socket_path)
            .await
            .map_err(|_| ClientError::NotRunning(self.socket_path.clone()))
    }

    #[cfg(windows)]
    async fn connect(&self) -> Result<tokio::net::windows::named_pipe::NamedPipeClient, ClientError> {
        let name = pipe_name(&self.socket_path);
        tokio::net::windows::named_pipe::ClientOptions::new()
            .open(&name)
            .map_err(|_| ClientError::NotRunning(self.socket_path.clone()))
    }
}

/// True if the daemon's socket (or pid file) is present, used by `barn
/// daemon start` to decide whether a daemon is already up before spawning
/// another one.
pub fn socket_exists(socket_path: &Path) -> bool {
    socket_path.exists()
}

#[cfg(windows)]
fn pipe_name(socket_path: &Path) -> String {
    let hash = socket_path.to_string_lossy().chars().fold(0u64, |acc, c| acc.wrapping_mul(31).wrapping_add(c as u64));
    format!(r"\\.\pipe\barn-{hash:x}")
}
