//! Observer server startup helper for embedding in the engine binary.
//!
//! Provides [`spawn_observer`] which binds the listener eagerly and then
//! runs the Observer HTTP + `WebSocket` server on a background Tokio task.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pulse_observer::startup::spawn_observer;
//! use pulse_observer::server::ServerConfig;
//!
//! let handle = spawn_observer(&ServerConfig::default(), state.clone()).await?;
//! // ... later
//! state.shutdown.cancel();
//! handle.await?;
//! ```

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::router::build_router;
use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the Observer HTTP server on a background Tokio task.
///
/// The listener is bound before this returns, so an unusable address is
/// reported here rather than from inside the task. The server stops when
/// `state.shutdown` is cancelled; await the returned handle to wait for it.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the server cannot bind to the
/// requested address.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let listener = server::bind(config).await?;
    let shutdown = state.shutdown.clone();
    let router = build_router(state, &config.allowed_origins);

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, router, shutdown).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(port = config.port, "Observer server spawned on background task");

    Ok(handle)
}
