//! Observer handle type.
//!
//! Observers attached to the broadcaster are addressed by a [`ClientId`]
//! rather than a bare [`Uuid`]. IDs are UUID v7, so sorting them gives
//! roughly attach order.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Opaque identifier for an observer attached to the event broadcaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClientId(Uuid);

impl ClientId {
    /// Allocate a fresh, time-ordered handle.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ClientId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique() {
        let first = ClientId::new();
        let second = ClientId::new();
        assert_ne!(first, second);
    }

    #[test]
    fn serializes_as_plain_uuid_string() {
        let id = ClientId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{id}\""));
    }
}
