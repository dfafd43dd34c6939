//! Broker publishing capability.
//!
//! The controller only knows the [`BrokerPublisher`] trait; the engine
//! binary supplies a NATS-backed implementation, tests supply fakes. The
//! trait returns a boxed future so it stays dyn-compatible and can be held
//! as `Arc<dyn BrokerPublisher>`.

use futures::future::BoxFuture;

/// Errors a broker publish can fail with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    /// No broker connection is available.
    #[error("broker unavailable: {0}")]
    Unavailable(String),

    /// The broker refused or failed to accept the payload.
    #[error("publish to {topic} rejected: {reason}")]
    Rejected {
        /// Destination topic.
        topic: String,
        /// Broker-reported cause.
        reason: String,
    },

    /// The payload could not be encoded.
    #[error("payload encoding failed: {0}")]
    Encode(String),
}

/// Sends opaque payloads to a named topic on an external broker.
///
/// Implementations may be slow or fail transiently; callers never retry.
pub trait BrokerPublisher: Send + Sync {
    /// Publish `payload` to `topic`.
    fn publish<'a>(
        &'a self,
        topic: &'a str,
        payload: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), PublishError>>;
}

/// Publisher used when no broker connection could be established.
///
/// Every publish fails with [`PublishError::Unavailable`], so the generator
/// keeps running and observers see one `error:occurred` per tick.
#[derive(Debug, Clone)]
pub struct DisconnectedPublisher {
    reason: String,
}

impl DisconnectedPublisher {
    /// Create a publisher that reports `reason` on every publish.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl BrokerPublisher for DisconnectedPublisher {
    fn publish<'a>(
        &'a self,
        _topic: &'a str,
        _payload: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), PublishError>> {
        let reason = self.reason.clone();
        Box::pin(async move { Err(PublishError::Unavailable(reason)) })
    }
}
