//! Observer stream events.
//!
//! Every notification the generator (or the broadcaster itself) sends to
//! attached observers is an [`ObserverEvent`]. The broadcaster stamps each
//! one with a server-assigned time, producing an [`EventEnvelope`], whose
//! JSON form is the frame pushed to `WebSocket` clients:
//!
//! ```json
//! { "event": "generator:started", "data": { "intervalMs": 1000 }, "timestamp": "..." }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::ClientId;
use crate::message::GeneratedMessage;
use crate::state::GeneratorState;

/// A named event delivered to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ObserverEvent {
    /// Sent once, only to a freshly attached observer.
    #[serde(rename = "connection:established")]
    ConnectionEstablished {
        /// Greeting text.
        message: String,
        /// The observer's own registration handle.
        #[serde(rename = "clientId")]
        client_id: ClientId,
    },

    /// The generator transitioned to running via start.
    #[serde(rename = "generator:started")]
    GeneratorStarted {
        /// Tick period the generator started with.
        #[serde(rename = "intervalMs")]
        interval_ms: u64,
    },

    /// The generator was paused.
    #[serde(rename = "generator:paused")]
    GeneratorPaused {},

    /// The generator was resumed.
    #[serde(rename = "generator:resumed")]
    GeneratorResumed {},

    /// The generator was stopped and its counters reset.
    #[serde(rename = "generator:stopped")]
    GeneratorStopped {},

    /// A fresh state snapshot.
    #[serde(rename = "generator:stateUpdated")]
    StateUpdated {
        /// The snapshot.
        state: GeneratorState,
    },

    /// A message was generated and accepted by the broker.
    #[serde(rename = "message:generated")]
    MessageGenerated {
        /// The published message.
        message: GeneratedMessage,
    },

    /// Something went wrong; generation continues.
    #[serde(rename = "error:occurred")]
    ErrorOccurred {
        /// Structured cause.
        error: GenerationError,
    },
}

impl ObserverEvent {
    /// Wire name of the event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ConnectionEstablished { .. } => "connection:established",
            Self::GeneratorStarted { .. } => "generator:started",
            Self::GeneratorPaused {} => "generator:paused",
            Self::GeneratorResumed {} => "generator:resumed",
            Self::GeneratorStopped {} => "generator:stopped",
            Self::StateUpdated { .. } => "generator:stateUpdated",
            Self::MessageGenerated { .. } => "message:generated",
            Self::ErrorOccurred { .. } => "error:occurred",
        }
    }
}

/// An [`ObserverEvent`] stamped with the time the broadcaster sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// The event name and payload.
    #[serde(flatten)]
    pub event: ObserverEvent,
    /// Server-assigned send time.
    pub timestamp: DateTime<Utc>,
}

impl EventEnvelope {
    /// Stamp `event` with the current time.
    pub fn now(event: ObserverEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
        }
    }

    /// Wire name of the wrapped event.
    pub const fn name(&self) -> &'static str {
        self.event.name()
    }
}

/// Category of an `error:occurred` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ErrorKind {
    /// A tick's message could not be published.
    MessageGenerationError,
    /// An observer sent a command that could not be parsed or was rejected.
    InvalidCommand,
}

/// Structured cause carried by `error:occurred`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GenerationError {
    /// Error category.
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
    /// ID of the message whose publish failed, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub message_id: Option<u64>,
    /// When the error was observed.
    pub timestamp: DateTime<Utc>,
}

impl GenerationError {
    /// A publish failure for message `message_id`.
    pub fn publish_failed(message_id: u64, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::MessageGenerationError,
            message: message.into(),
            message_id: Some(message_id),
            timestamp: Utc::now(),
        }
    }

    /// A rejected or malformed observer command.
    pub fn invalid_command(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidCommand,
            message: message.into(),
            message_id: None,
            timestamp: Utc::now(),
        }
    }
}
