//! Generator state snapshot served to observers and command surfaces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Point-in-time copy of the generator's state.
///
/// The controller owns the authoritative instance; every query and every
/// `generator:stateUpdated` event carries a clone, so holders can never
/// observe later mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GeneratorState {
    /// Whether a scheduling timer is currently armed.
    pub is_running: bool,
    /// Period between ticks in milliseconds.
    pub interval_ms: u64,
    /// Messages generated since the last stop.
    pub message_count: u64,
    /// Time of the most recent tick (or of the last start/resume).
    /// Cleared by stop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub last_message_time: Option<DateTime<Utc>>,
}

impl GeneratorState {
    /// Fresh, stopped state with the given configured interval.
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            is_running: false,
            interval_ms,
            message_count: 0,
            last_message_time: None,
        }
    }

    /// Derive the lifecycle phase from the snapshot.
    ///
    /// `last_message_time` is set by start and cleared only by stop, so a
    /// non-running state that still carries it has been paused.
    pub const fn phase(&self) -> GeneratorPhase {
        if self.is_running {
            GeneratorPhase::Running
        } else if self.last_message_time.is_some() {
            GeneratorPhase::Paused
        } else {
            GeneratorPhase::Stopped
        }
    }
}

/// Lifecycle phase of the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GeneratorPhase {
    /// No timer; counters reset.
    Stopped,
    /// Timer armed and ticking.
    Running,
    /// Timer cancelled, counters retained.
    Paused,
}

impl core::fmt::Display for GeneratorPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_stopped() {
        let state = GeneratorState::new(5000);
        assert_eq!(state.phase(), GeneratorPhase::Stopped);
        assert_eq!(state.message_count, 0);
    }

    #[test]
    fn paused_is_not_running_with_timestamp() {
        let state = GeneratorState {
            is_running: false,
            interval_ms: 1000,
            message_count: 3,
            last_message_time: Some(Utc::now()),
        };
        assert_eq!(state.phase(), GeneratorPhase::Paused);
    }

    #[test]
    fn serializes_camel_case_and_omits_missing_time() {
        let json = serde_json::to_value(GeneratorState::new(2500)).unwrap();
        assert_eq!(json["isRunning"], false);
        assert_eq!(json["intervalMs"], 2500);
        assert_eq!(json["messageCount"], 0);
        assert!(json.get("lastMessageTime").is_none());
    }
}
