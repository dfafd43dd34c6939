//! Error types for the Observer API server.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pulse_core::command::CommandError;
use pulse_core::publish::PublishError;

/// Errors that can occur in the Observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// A serialization error while building a response or payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The request body could not be parsed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A generator command failed validation.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The broker rejected or could not take a publish.
    #[error(transparent)]
    Broker(#[from] PublishError),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
            Self::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Command(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::Broker(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Parse a JSON request body, reporting failures as 400s.
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ObserverError> {
    serde_json::from_slice(body).map_err(|e| ObserverError::InvalidRequest(e.to_string()))
}
