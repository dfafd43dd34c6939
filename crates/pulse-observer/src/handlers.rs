//! Status page, observer listing, and ad-hoc publish endpoints.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/observers` | Attached observer count and IDs |
//! | `POST` | `/api/publish` | Publish a test message to the broker |

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use pulse_types::ClientId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ObserverError, parse_json};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing generator status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let generator = state.controller.get_state().await;
    let phase = generator.phase();
    let interval_ms = generator.interval_ms;
    let message_count = generator.message_count;
    let last_message = generator
        .last_message_time
        .map_or_else(|| "--".to_owned(), |t| t.to_rfc3339());
    let observers = state.broadcaster.observer_count();
    let topic = state.controller.topic();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Pulse Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        code {{ color: #7ee787; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Pulse Observer</h1>
    <p class="subtitle">Synthetic event generator publishing to <code>{topic}</code></p>

    <div>
        <div class="metric">
            <div class="label">Status</div>
            <div class="value">{phase}</div>
        </div>
        <div class="metric">
            <div class="label">Interval (ms)</div>
            <div class="value">{interval_ms}</div>
        </div>
        <div class="metric">
            <div class="label">Messages</div>
            <div class="value">{message_count}</div>
        </div>
        <div class="metric">
            <div class="label">Observers</div>
            <div class="value">{observers}</div>
        </div>
    </div>
    <p>Last message: {last_message}</p>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li><code>POST /api/generator/start</code> -- Start generating</li>
        <li><code>PUT /api/generator/pause</code> -- Pause</li>
        <li><code>PUT /api/generator/resume</code> -- Resume</li>
        <li><code>PUT /api/generator/stop</code> -- Stop and reset</li>
        <li><code>PUT /api/generator/interval</code> -- Change interval</li>
        <li><code>GET /api/generator/state</code> -- Current state</li>
        <li><code>GET /api/observers</code> -- Attached observers</li>
        <li><code>POST /api/publish</code> -- Publish a test message</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws/dashboard</code> -- Live generator events</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/observers
// ---------------------------------------------------------------------------

/// Attached observers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObserversResponse {
    /// Number of attached observers.
    pub count: usize,
    /// Their registration handles.
    pub client_ids: Vec<ClientId>,
}

/// List attached observers.
pub async fn list_observers(State(state): State<Arc<AppState>>) -> Json<ObserversResponse> {
    let client_ids = state.broadcaster.observer_ids();
    Json(ObserversResponse {
        count: client_ids.len(),
        client_ids,
    })
}

// ---------------------------------------------------------------------------
// POST /api/publish
// ---------------------------------------------------------------------------

/// Body of `POST /api/publish`.
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    /// Destination topic; the generator topic when absent.
    #[serde(default)]
    pub topic: Option<String>,
    /// Arbitrary JSON payload.
    pub message: serde_json::Value,
}

/// Result of an ad-hoc publish.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    /// Whether the broker accepted the message.
    pub ok: bool,
    /// Human-readable summary.
    pub message: String,
    /// Topic the message went to.
    pub topic: String,
}

/// Publish a caller-supplied message to the broker.
///
/// Broker failures answer 502 with the broker's error.
pub async fn publish_message(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PublishResponse>, ObserverError> {
    let request: PublishRequest = parse_json(&body)?;
    let topic = request
        .topic
        .unwrap_or_else(|| state.controller.topic().to_owned());
    let payload = serde_json::to_vec(&request.message)?;

    state.publisher.publish(&topic, payload).await?;
    info!(%topic, "Ad-hoc message published");

    Ok(Json(PublishResponse {
        ok: true,
        message: "Message published".to_owned(),
        topic,
    }))
}
