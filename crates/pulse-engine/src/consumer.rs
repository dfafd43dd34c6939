//! Generator topic consumer.
//!
//! Subscribes to the topic the generator publishes to and logs every
//! message that arrives, which makes the full publish path visible in the
//! engine's own log without a separate consumer process.

use futures::StreamExt as _;
use pulse_types::GeneratedMessage;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Longest raw payload excerpt included in a log line.
const MAX_EXCERPT: usize = 120;

/// Spawn a task that logs everything published on `topic` until
/// `shutdown` is cancelled.
pub fn spawn_consumer(
    client: async_nats::Client,
    topic: String,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut subscriber = match client.subscribe(topic.clone()).await {
            Ok(subscriber) => subscriber,
            Err(e) => {
                warn!(%topic, error = %e, "Failed to subscribe, topic consumer disabled");
                return;
            }
        };
        info!(%topic, "Topic consumer started");

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                message = subscriber.next() => {
                    let Some(message) = message else {
                        debug!(%topic, "Subscription closed");
                        break;
                    };
                    info!(
                        subject = %message.subject,
                        "Received {}",
                        describe(&message.payload)
                    );
                }
            }
        }

        if let Err(e) = subscriber.unsubscribe().await {
            debug!(%topic, "Unsubscribe failed: {e}");
        }
        info!(%topic, "Topic consumer stopped");
    })
}

/// One-line summary of a received payload.
///
/// Generator messages are summarised by ID and event type; anything else
/// is shown as a (possibly truncated) lossy UTF-8 excerpt.
pub fn describe(payload: &[u8]) -> String {
    if let Ok(message) = serde_json::from_slice::<GeneratedMessage>(payload) {
        return format!(
            "message {} ({}) from {}",
            message.id,
            message.event_type(),
            message.source
        );
    }

    let text = String::from_utf8_lossy(payload);
    let excerpt: String = text.chars().take(MAX_EXCERPT).collect();
    if excerpt.len() < text.len() {
        format!("raw payload: {excerpt}...")
    } else {
        format!("raw payload: {excerpt}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use pulse_types::{EventDetails, UserSession};

    use super::*;

    #[test]
    fn describes_generator_messages() {
        let message = GeneratedMessage {
            id: 12,
            timestamp: Utc::now(),
            source: "message-generator".to_owned(),
            details: EventDetails::UserLogin(UserSession {
                user_id: 3,
                session_id: "session_abc123xyz".to_owned(),
            }),
        };
        let payload = serde_json::to_vec(&message).unwrap();
        assert_eq!(
            describe(&payload),
            "message 12 (user_login) from message-generator"
        );
    }

    #[test]
    fn describes_foreign_payloads() {
        assert_eq!(describe(b"{\"hello\":1}"), "raw payload: {\"hello\":1}");
    }

    #[test]
    fn truncates_long_payloads() {
        let long = "x".repeat(500);
        let described = describe(long.as_bytes());
        assert!(described.ends_with("..."));
        assert!(described.len() < 200);
    }
}
