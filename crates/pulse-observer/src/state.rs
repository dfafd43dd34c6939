//! Shared application state for the Observer API server.
//!
//! [`AppState`] bundles the long-lived components every handler needs: the
//! generator controller (commands and state queries), the broadcaster
//! (observer registry), the broker publisher (ad-hoc publishes), and the
//! shutdown token that ends the server and every open `WebSocket`.

use std::sync::Arc;

use pulse_core::controller::GeneratorController;
use pulse_core::publish::BrokerPublisher;
use tokio_util::sync::CancellationToken;

use crate::broadcaster::EventBroadcaster;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// The generator state machine.
    pub controller: Arc<GeneratorController>,
    /// Observer registry and event fan-out.
    pub broadcaster: Arc<EventBroadcaster>,
    /// Broker used by `POST /api/publish`.
    pub publisher: Arc<dyn BrokerPublisher>,
    /// Cancelled when the server should shut down.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create application state with a fresh shutdown token.
    pub fn new(
        controller: Arc<GeneratorController>,
        broadcaster: Arc<EventBroadcaster>,
        publisher: Arc<dyn BrokerPublisher>,
    ) -> Self {
        Self {
            controller,
            broadcaster,
            publisher,
            shutdown: CancellationToken::new(),
        }
    }
}
