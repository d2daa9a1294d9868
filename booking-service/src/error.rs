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

/// Booking service error taxonomy, mapped to HTTP status codes.
///
/// There is deliberately no "event service unreachable" variant: transport
/// failures are absorbed inside the client and surface here as
/// [`BookingError::ReservationFailed`], the same outcome as a declined
/// reservation.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// No booking with the given id exists.
    #[error("booking not found: {0}")]
    NotFound(i64),

    /// The event service declined the seat reservation, either because
    /// seats ran out or because it could not be reached.
    #[error("unable to reserve {seats} seats for event {event_id}")]
    ReservationFailed { event_id: i64, seats: i32 },

    /// The booking is already cancelled or refunded.
    #[error("booking {0} cannot be cancelled")]
    NotCancellable(i64),

    /// Only pending bookings can be confirmed.
    #[error("booking {0} is not awaiting confirmation")]
    NotConfirmable(i64),

    /// Request payload failed field-level validation.
    #[error("invalid booking request")]
    Validation(HashMap<String, String>),
}

impl BookingError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ReservationFailed { .. } | Self::NotCancellable(_) | Self::NotConfirmable(_) => {
                StatusCode::CONFLICT
            }
            Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for BookingError {
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
