//! Observer notification capability.
//!
//! The controller reports every transition, message, and error through an
//! [`EventSink`]. It never learns who is listening: the broadcaster in the
//! observer crate implements this trait and owns the observer registry.

use pulse_types::ObserverEvent;

/// Receives generator notifications.
///
/// `emit` is called after the controller has released its lock and must not
/// block; slow consumers are the implementation's problem.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn emit(&self, event: ObserverEvent);
}

/// Sink that discards everything. Useful when no observers are wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ObserverEvent) {}
}
