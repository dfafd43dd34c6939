//! Observer API server and event fan-out for the Pulse event generator.
//!
//! This crate provides:
//!
//! - **[`EventBroadcaster`]** -- the observer registry; implements the
//!   controller's `EventSink` and fans every event out to attached
//!   observers through bounded per-observer queues
//! - **`WebSocket` endpoint** (`/ws/dashboard`) streaming generator events
//!   and accepting generator commands
//! - **Generator REST endpoints** for start, pause, resume, stop, interval
//!   changes, and state queries
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! The controller never talks to sockets. It emits events into the
//! broadcaster; each `WebSocket` connection owns one
//! [`Subscription`](broadcaster::Subscription) and drains it. A slow
//! client can only lose its own events.

pub mod broadcaster;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use broadcaster::{EventBroadcaster, Subscription};
pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use state::AppState;
