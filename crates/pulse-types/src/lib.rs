//! Shared type definitions for the Pulse event generator.
//!
//! This crate is the single source of truth for every value that crosses a
//! component or process boundary: the generator state snapshot, the
//! synthetic messages published to the broker, and the events pushed to
//! observers. Types that the dashboard consumes are exported to
//! `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for observer handles
//! - [`state`] -- Generator state snapshot and lifecycle phase
//! - [`message`] -- Generated message, event kinds, per-kind field shapes
//! - [`events`] -- Observer events, envelopes, structured errors

pub mod events;
pub mod ids;
pub mod message;
pub mod state;

// Re-export all public types at crate root for convenience.
pub use events::{ErrorKind, EventEnvelope, GenerationError, ObserverEvent};
pub use ids::ClientId;
pub use message::{
    ApiCallDetails, ErrorDetails, EventDetails, EventKind, GeneratedMessage, HealthCheckDetails,
    HealthStatus, HttpMethod, InventoryDetails, NotificationChannel, NotificationDetails,
    OrderDetails, PaymentDetails, PaymentStatus, UserSession,
};
pub use state::{GeneratorPhase, GeneratorState};
