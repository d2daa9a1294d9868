use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error body for not-found and conflict responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Event service error taxonomy, mapped to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum EventServiceError {
    /// No event with the given id exists in the ledger.
    #[error("event not found: {0}")]
    NotFound(i64),

    /// Request payload failed field-level validation.
    #[error("invalid event payload")]
    Validation(HashMap<String, String>),
}

impl EventServiceError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for EventServiceError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => {
                let body = serde_json::json!({
                    "status": StatusCode::BAD_REQUEST.as_u16(),
                    "errors": errors,
                });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            other => {
                let status = other.status_code();
                let body = ErrorResponse {
                    error: other.to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
