//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS and request tracing middleware.

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;
use crate::{generator, handlers, ws};

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/dashboard` -- `WebSocket` event stream and command channel
/// - `POST /api/generator/start` -- start generating
/// - `PUT /api/generator/pause` -- pause
/// - `PUT /api/generator/resume` -- resume
/// - `PUT /api/generator/stop` -- stop and reset
/// - `PUT /api/generator/interval` -- change the interval
/// - `GET /api/generator/state` -- current state
/// - `GET /api/observers` -- attached observers
/// - `POST /api/publish` -- ad-hoc broker publish
///
/// `allowed_origins` restricts CORS to the listed dashboard origins; an
/// empty list allows any origin.
pub fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/dashboard", get(ws::ws_dashboard))
        // Generator control
        .route("/api/generator/start", post(generator::start))
        .route("/api/generator/pause", put(generator::pause))
        .route("/api/generator/resume", put(generator::resume))
        .route("/api/generator/stop", put(generator::stop))
        .route("/api/generator/interval", put(generator::set_interval))
        .route("/api/generator/state", get(generator::get_state))
        // Observers and broker
        .route("/api/observers", get(handlers::list_observers))
        .route("/api/publish", post(handlers::publish_message))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%origin, "Ignoring invalid CORS origin: {e}");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(origins))
    }
}
