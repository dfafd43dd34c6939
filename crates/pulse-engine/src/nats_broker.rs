//! NATS-backed [`BrokerPublisher`].
//!
//! Each publish is followed by a flush so that a dead connection surfaces
//! as a failed tick instead of silently buffering in the client.

use futures::future::BoxFuture;
use pulse_core::publish::{BrokerPublisher, PublishError};
use tracing::info;

use crate::error::EngineError;

/// Publishes generator payloads to NATS subjects.
pub struct NatsBroker {
    client: async_nats::Client,
}

impl NatsBroker {
    /// Connect to a NATS server.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Nats`] if the connection cannot be established.
    pub async fn connect(url: &str) -> Result<Self, EngineError> {
        info!(url = url, "Connecting to NATS");
        let client = async_nats::connect(url)
            .await
            .map_err(|e| EngineError::Nats {
                message: format!("failed to connect to {url}: {e}"),
            })?;
        info!("NATS connection established");
        Ok(Self { client })
    }

    /// A handle to the underlying connection, for subscribers.
    pub fn client(&self) -> async_nats::Client {
        self.client.clone()
    }
}

impl BrokerPublisher for NatsBroker {
    fn publish<'a>(
        &'a self,
        topic: &'a str,
        payload: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), PublishError>> {
        Box::pin(async move {
            self.client
                .publish(topic.to_owned(), payload.into())
                .await
                .map_err(|e| PublishError::Rejected {
                    topic: topic.to_owned(),
                    reason: e.to_string(),
                })?;
            self.client
                .flush()
                .await
                .map_err(|e| PublishError::Unavailable(format!("flush failed: {e}")))
        })
    }
}
