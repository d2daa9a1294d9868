use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_traits::FromPrimitive;
use serde::Deserialize;

use crate::error::BookingError;
use crate::models::{Booking, NewBooking};
use crate::service::BookingService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BookingService>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub event_id: Option<i64>,
    pub user_id: Option<i64>,
    pub number_of_tickets: Option<i32>,
    pub total_price: Option<f64>,
    pub user_email: Option<String>,
    pub event_name: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl BookingRequest {
    fn validate(self) -> Result<NewBooking, BookingError> {
        let mut errors = HashMap::new();

        if self.event_id.is_none() {
            errors.insert("eventId".to_string(), "eventId is required".to_string());
        }
        if self.user_id.is_none() {
            errors.insert("userId".to_string(), "userId is required".to_string());
        }
        let number_of_tickets = match self.number_of_tickets {
            Some(n) if n >= 1 => Some(n),
            Some(_) => {
                errors.insert(
                    "numberOfTickets".to_string(),
                    "At least one ticket is required".to_string(),
                );
                None
            }
            None => {
                errors.insert(
                    "numberOfTickets".to_string(),
                    "numberOfTickets is required".to_string(),
                );
                None
            }
        };
        let total_price = match self.total_price {
            Some(p) if p > 0.0 => BigDecimal::from_f64(p),
            Some(_) => {
                errors.insert(
                    "totalPrice".to_string(),
                    "Total price must be positive".to_string(),
                );
                None
            }
            None => {
                errors.insert(
                    "totalPrice".to_string(),
                    "totalPrice is required".to_string(),
                );
                None
            }
        };
        let user_email = match self.user_email {
            Some(email) if email.trim().is_empty() => {
                errors.insert("userEmail".to_string(), "userEmail is required".to_string());
                None
            }
            Some(email) if !email.contains('@') => {
                errors.insert(
                    "userEmail".to_string(),
                    "userEmail must be a valid email".to_string(),
                );
                None
            }
            Some(email) => Some(email),
            None => {
                errors.insert("userEmail".to_string(), "userEmail is required".to_string());
                None
            }
        };
        let event_name = match self.event_name {
            Some(name) if !name.trim().is_empty() => Some(name),
            _ => {
                errors.insert("eventName".to_string(), "eventName is required".to_string());
                None
            }
        };
        if self.event_date.is_none() {
            errors.insert("eventDate".to_string(), "eventDate is required".to_string());
        }

        if !errors.is_empty() {
            return Err(BookingError::Validation(errors));
        }

        match (
            self.event_id,
            self.user_id,
            number_of_tickets,
            total_price,
            user_email,
            event_name,
            self.event_date,
        ) {
            (
                Some(event_id),
                Some(user_id),
                Some(number_of_tickets),
                Some(total_price),
                Some(user_email),
                Some(event_name),
                Some(event_date),
            ) => Ok(NewBooking {
                event_id,
                user_id,
                number_of_tickets,
                total_price,
                user_email,
                event_name,
                event_date,
                notes: self.notes,
            }),
            _ => Err(BookingError::Validation(errors)),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/bookings", post(create_booking).get(list_bookings))
        .route("/bookings/health", get(health_check))
        .route("/bookings/:id", get(get_booking))
        .route("/bookings/:id/confirm", post(confirm_booking))
        .route("/bookings/:id/cancel", post(cancel_booking))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>), BookingError> {
    let new_booking = request.validate()?;
    let booking = state.service.create_booking(new_booking).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_bookings(State(state): State<AppState>) -> Json<Vec<Booking>> {
    Json(state.service.list_bookings().await)
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, BookingError> {
    let booking = state.service.get_booking(id).await?;
    Ok(Json(booking))
}

pub async fn confirm_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, BookingError> {
    let booking = state.service.confirm_booking(id).await?;
    Ok(Json(booking))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, BookingError> {
    let booking = state.service.cancel_booking(id).await?;
    Ok(Json(booking))
}

pub async fn health_check() -> &'static str {
    "Booking Service is running"
}
