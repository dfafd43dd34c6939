//! `WebSocket` endpoint for dashboard clients.
//!
//! Clients connect to `GET /ws/dashboard`. Each connection attaches one
//! observer to the [`EventBroadcaster`](crate::broadcaster::EventBroadcaster)
//! and forwards every event as a JSON text frame:
//!
//! ```json
//! { "event": "message:generated", "data": { "message": { ... } }, "timestamp": "..." }
//! ```
//!
//! The same socket accepts generator commands (see
//! [`GeneratorCommand`]). `generator:getState` is answered to the asking
//! client only; malformed or rejected commands produce an
//! `error:occurred` event for the sender only.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use pulse_core::command::GeneratorCommand;
use pulse_types::{ClientId, GenerationError, ObserverEvent};
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming generator events.
///
/// # Route
///
/// `GET /ws/dashboard`
pub async fn ws_dashboard(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: attach an observer, forward its events,
/// and dispatch inbound commands until either side goes away.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut subscription = state.broadcaster.attach();
    let client_id = subscription.client_id();
    debug!(%client_id, "WebSocket client connected");

    loop {
        tokio::select! {
            () = state.shutdown.cancelled() => {
                debug!(%client_id, "Server shutting down, closing WebSocket");
                if socket.send(Message::Close(None)).await.is_err() {
                    debug!(%client_id, "Close frame not delivered");
                }
                return;
            }
            // Forward the next broadcast event.
            envelope = subscription.recv() => {
                let Some(envelope) = envelope else {
                    debug!(%client_id, "Observer queue closed, shutting down WebSocket");
                    return;
                };
                let json = match serde_json::to_string(&*envelope) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!("Failed to serialize {} event: {e}", envelope.name());
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(%client_id, "WebSocket client disconnected (send failed)");
                    return;
                }
            }
            // Commands, pings, and disconnects from the client.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text_frame(&state, client_id, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%client_id, "WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%client_id, "WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%client_id, "WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Binary and pong frames carry nothing for us.
                    }
                }
            }
        }
    }
}

/// Parse and execute one inbound text frame from `client_id`.
///
/// Replies, when any, go through the broadcaster to that client only;
/// state changes reach everyone through the controller's own events.
pub async fn handle_text_frame(state: &AppState, client_id: ClientId, text: &str) {
    let command = match serde_json::from_str::<GeneratorCommand>(text) {
        Ok(command) => command,
        Err(e) => {
            debug!(%client_id, "Unrecognized WebSocket command: {e}");
            reject(state, client_id, format!("unrecognized command: {e}"));
            return;
        }
    };

    debug!(%client_id, command = command.name(), "WebSocket command received");
    match command.apply(&state.controller).await {
        Ok(snapshot) => {
            if command == GeneratorCommand::GetState {
                state
                    .broadcaster
                    .send_to(client_id, ObserverEvent::StateUpdated { state: snapshot });
            }
        }
        Err(e) => {
            debug!(%client_id, command = command.name(), "WebSocket command rejected: {e}");
            reject(state, client_id, e.to_string());
        }
    }
}

fn reject(state: &AppState, client_id: ClientId, message: String) {
    let error = GenerationError::invalid_command(message);
    state
        .broadcaster
        .send_to(client_id, ObserverEvent::ErrorOccurred { error });
}
