//! Generator control REST endpoints.
//!
//! Each handler turns its request into a [`GeneratorCommand`], which
//! validates it and applies it to the controller. Every success answers
//! with the resulting state snapshot.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/generator/start` | Start (optional `{ "intervalMs": n }`) |
//! | `PUT` | `/api/generator/pause` | Pause generation |
//! | `PUT` | `/api/generator/resume` | Resume generation |
//! | `PUT` | `/api/generator/stop` | Stop and reset the counter |
//! | `PUT` | `/api/generator/interval` | Change the interval (`{ "intervalMs": n }`) |
//! | `GET` | `/api/generator/state` | Current state |

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use pulse_core::command::GeneratorCommand;
use pulse_types::GeneratorState;
use serde::{Deserialize, Serialize};

use crate::error::{ObserverError, parse_json};
use crate::state::AppState;

/// Body of `POST /api/generator/start`. The whole body may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    /// Tick period; the configured default when absent.
    #[serde(default)]
    pub interval_ms: Option<u64>,
}

/// Body of `PUT /api/generator/interval`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalRequest {
    /// New tick period.
    pub interval_ms: u64,
}

/// Response to every generator command.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// Whether the command was accepted.
    pub ok: bool,
    /// Human-readable summary.
    pub message: String,
    /// State after the command.
    pub state: GeneratorState,
}

/// Apply `command` and wrap the resulting state.
async fn run(
    state: &AppState,
    command: GeneratorCommand,
    message: &str,
) -> Result<Json<CommandResponse>, ObserverError> {
    let snapshot = command.apply(&state.controller).await?;
    Ok(Json(CommandResponse {
        ok: true,
        message: message.to_owned(),
        state: snapshot,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/generator/start
// ---------------------------------------------------------------------------

/// Start the generator.
pub async fn start(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CommandResponse>, ObserverError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        StartRequest::default()
    } else {
        parse_json::<StartRequest>(&body)?
    };
    let command = GeneratorCommand::Start {
        interval_ms: request.interval_ms,
    };
    run(&state, command, "Message generator started").await
}

// ---------------------------------------------------------------------------
// PUT /api/generator/{pause,resume,stop}
// ---------------------------------------------------------------------------

/// Pause the generator.
pub async fn pause(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommandResponse>, ObserverError> {
    run(&state, GeneratorCommand::Pause, "Message generator paused").await
}

/// Resume the generator.
pub async fn resume(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommandResponse>, ObserverError> {
    run(&state, GeneratorCommand::Resume, "Message generator resumed").await
}

/// Stop the generator and reset its counter.
pub async fn stop(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommandResponse>, ObserverError> {
    run(&state, GeneratorCommand::Stop, "Message generator stopped").await
}

// ---------------------------------------------------------------------------
// PUT /api/generator/interval
// ---------------------------------------------------------------------------

/// Change the tick interval. Intervals below 100 ms are rejected with 400.
pub async fn set_interval(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CommandResponse>, ObserverError> {
    let request: IntervalRequest = parse_json(&body)?;
    let command = GeneratorCommand::SetInterval {
        interval_ms: request.interval_ms,
    };
    let message = format!("Interval updated to {} ms", request.interval_ms);
    run(&state, command, &message).await
}

// ---------------------------------------------------------------------------
// GET /api/generator/state
// ---------------------------------------------------------------------------

/// Return the current generator state.
pub async fn get_state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommandResponse>, ObserverError> {
    run(&state, GeneratorCommand::GetState, "Current generator state").await
}
