// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The IPC listener (§4.13): accepts one connection at a time, reads a
//! single length-prefixed `Request`, dispatches it, writes the
//! `Response`, and closes. No multiplexing, no connection reuse -- every
//! `barn` CLI invocation is its own connection.

use std::path::Path;
use std::sync::Arc;

use barn_core::Clock;
use barn_wire::{read_message, write_message, Request};
use tokio::sync::oneshot;

use crate::error::LifecycleError;
use crate::handlers::Handlers;

/// Runs the accept loop until `shutdown` resolves. Each accepted
/// connection is handled on its own task so a slow or misbehaving client
/// cannot stall the next caller.
pub async fn serve<C: Clock + 'static>(
    socket_path: &Path,
    handlers: Arc<Handlers<C>>,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<(), LifecycleError> {
    let listener = bind(socket_path)?;

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok(stream) => {
                        let handlers = Arc::clone(&handlers);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, handlers).await {
                                tracing::warn!(error = %e, "IPC connection ended with an error");
                            }
                        });
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to accept IPC connection"),
                }
            }
            _ = &mut shutdown => {
                tracing::info!("IPC listener shutting down");
                return Ok(());
            }
        }
    }
}

async fn handle_connection<C, S>(mut stream: S, handlers: Arc<Handlers<C>>) -> Result<(), barn_wire::FramingError>
where
    C: Clock + 'static,
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let request: Request = read_message(&mut stream).await?;
    let response = handlers.handle(request).await;
    write_message(&mut stream, &response).await
}

#[cfg(unix)]
fn bind(socket_path: &Path) -> Result<tokio::net::UnixListener, LifecycleError> {
    if socket_path.exists() {
        let _ = std::fs::remove_file(socket_path);
    }
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tokio::net::UnixListener::bind(socket_path)
        .map_err(|e| LifecycleError::Bind(socket_path.to_path_buf(), e))
}

/// Windows has no Unix domain sockets; the equivalent transport is a
/// named pipe. Not exercised by tests on this platform, but present so
/// the embedding contract is uniform across targets (§4.13).
#[cfg(windows)]
fn bind(socket_path: &Path) -> Result<NamedPipeListener, LifecycleError> {
    NamedPipeListener::new(socket_path).map_err(|e| LifecycleError::Bind(socket_path.to_path_buf(), e))
}

#[cfg(windows)]
struct NamedPipeListener {
    name: String,
}

#[cfg(windows)]
impl NamedPipeListener {
    fn new(socket_path: &Path) -> std::io::Result<Self> {
        let hash = socket_path.to_string_lossy().chars().fold(0u64, |acc, c| {
            acc.wrapping_mul(31).wrapping_add(c as u64)
        });
        Ok(Self { name: format!(r"\\.\pipe\barn-{hash:x}") })
    }

    async fn accept(&self) -> std::io::Result<tokio::net::windows::named_pipe::NamedPipeServer> {
        let server = tokio::net::windows::named_pipe::ServerOptions::new()
            .first_pipe_instance(false)
            .create(&self.name)?;
        server.connect().await?;
        Ok(server)
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
