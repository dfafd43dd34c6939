//! Transport-agnostic generator commands.
//!
//! Both the REST handlers and the `WebSocket` endpoint translate their input
//! into a [`GeneratorCommand`], validate it, and apply it to the controller.
//! The controller itself performs no validation.
//!
//! The JSON form matches what dashboard clients send over the socket:
//!
//! ```json
//! { "event": "generator:start", "data": { "intervalMs": 2000 } }
//! { "event": "generator:pause", "data": {} }
//! ```
//!
//! `data` may be omitted, `null`, or an object for every command except
//! `generator:updateInterval`, which needs `intervalMs`.

use pulse_types::GeneratorState;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::controller::GeneratorController;

/// Smallest interval a command may request.
pub const MIN_INTERVAL_MS: u64 = 100;

/// Interval used when neither the command nor the configuration gives one.
pub const DEFAULT_INTERVAL_MS: u64 = 5000;

/// Reasons a command is rejected before reaching the controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The requested interval is below [`MIN_INTERVAL_MS`].
    #[error("interval must be at least {MIN_INTERVAL_MS} ms, got {0}")]
    IntervalTooShort(u64),

    /// The frame names no known command.
    #[error("unknown command `{0}`")]
    Unknown(String),

    /// The frame's `data` does not fit the command.
    #[error("invalid data for `{command}`: {reason}")]
    InvalidData {
        /// Wire name of the command.
        command: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// A control command for the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum GeneratorCommand {
    /// Start generating; `None` uses the controller's default interval.
    #[serde(rename = "generator:start")]
    Start {
        /// Requested tick period.
        #[serde(rename = "intervalMs", skip_serializing_if = "Option::is_none")]
        interval_ms: Option<u64>,
    },
    /// Pause generation.
    #[serde(rename = "generator:pause")]
    Pause,
    /// Resume generation.
    #[serde(rename = "generator:resume")]
    Resume,
    /// Stop generation and reset the counter.
    #[serde(rename = "generator:stop")]
    Stop,
    /// Change the tick period.
    #[serde(rename = "generator:updateInterval")]
    SetInterval {
        /// New tick period.
        #[serde(rename = "intervalMs")]
        interval_ms: u64,
    },
    /// Query the current state.
    #[serde(rename = "generator:getState")]
    GetState,
}

/// A command frame as it arrives on the wire.
#[derive(Deserialize)]
struct CommandFrame {
    event: String,
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

/// Arguments carried by the interval-bearing commands.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntervalArgs {
    #[serde(default)]
    interval_ms: Option<u64>,
}

impl TryFrom<CommandFrame> for GeneratorCommand {
    type Error = CommandError;

    fn try_from(frame: CommandFrame) -> Result<Self, Self::Error> {
        let command = match frame.event.as_str() {
            "generator:pause" => return Ok(Self::Pause),
            "generator:resume" => return Ok(Self::Resume),
            "generator:stop" => return Ok(Self::Stop),
            "generator:getState" => return Ok(Self::GetState),
            "generator:start" => "generator:start",
            "generator:updateInterval" => "generator:updateInterval",
            _ => return Err(CommandError::Unknown(frame.event)),
        };

        let invalid = |reason: String| CommandError::InvalidData { command, reason };
        let args: IntervalArgs =
            serde_json::from_value(Value::Object(frame.data.unwrap_or_default()))
                .map_err(|e| invalid(e.to_string()))?;

        match (command, args.interval_ms) {
            ("generator:start", interval_ms) => Ok(Self::Start { interval_ms }),
            (_, Some(interval_ms)) => Ok(Self::SetInterval { interval_ms }),
            (_, None) => Err(invalid("missing field `intervalMs`".to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for GeneratorCommand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let frame = CommandFrame::deserialize(deserializer)?;
        Self::try_from(frame).map_err(serde::de::Error::custom)
    }
}

impl GeneratorCommand {
    /// Wire name of the command.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start { .. } => "generator:start",
            Self::Pause => "generator:pause",
            Self::Resume => "generator:resume",
            Self::Stop => "generator:stop",
            Self::SetInterval { .. } => "generator:updateInterval",
            Self::GetState => "generator:getState",
        }
    }

    /// Check the command's arguments.
    pub const fn validate(self) -> Result<Self, CommandError> {
        match self {
            Self::Start {
                interval_ms: Some(ms),
            }
            | Self::SetInterval { interval_ms: ms }
                if ms < MIN_INTERVAL_MS =>
            {
                Err(CommandError::IntervalTooShort(ms))
            }
            _ => Ok(self),
        }
    }

    /// Validate, then run the command against `controller`.
    ///
    /// Returns the state after the command took effect.
    pub async fn apply(
        self,
        controller: &GeneratorController,
    ) -> Result<GeneratorState, CommandError> {
        let state = match self.validate()? {
            Self::Start { interval_ms } => {
                controller
                    .start(interval_ms.unwrap_or_else(|| controller.default_interval_ms()))
                    .await
            }
            Self::Pause => controller.pause().await,
            Self::Resume => controller.resume().await,
            Self::Stop => controller.stop().await,
            Self::SetInterval { interval_ms } => controller.set_interval(interval_ms).await,
            Self::GetState => controller.get_state().await,
        };
        Ok(state)
    }
}
