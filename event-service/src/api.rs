use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, patch, post};
use axum::Router;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_traits::FromPrimitive;
use serde::Deserialize;
use shared::SeatsQuery;
use tracing::info;

use crate::error::EventServiceError;
use crate::ledger::InventoryLedger;
use crate::models::{Event, EventCategory, EventUpdate, NewEvent};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<InventoryLedger>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<EventCategory>,
    pub location: Option<String>,
    #[serde(alias = "date")]
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub available_seats: Option<i32>,
    pub base_price: Option<f64>,
    pub organizer_id: Option<i64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "date")]
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub base_price: Option<f64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
}

impl CreateEventRequest {
    fn validate(self) -> Result<NewEvent, EventServiceError> {
        let mut errors = HashMap::new();

        let name = match self.name {
            Some(n) if !n.trim().is_empty() => Some(n),
            _ => {
                errors.insert("name".to_string(), "name is required".to_string());
                None
            }
        };
        let location = match self.location {
            Some(l) if !l.trim().is_empty() => Some(l),
            _ => {
                errors.insert("location".to_string(), "location is required".to_string());
                None
            }
        };
        if self.category.is_none() {
            errors.insert("category".to_string(), "category is required".to_string());
        }
        if self.start_date.is_none() {
            errors.insert("startDate".to_string(), "startDate is required".to_string());
        }
        if self.end_date.is_none() {
            errors.insert("endDate".to_string(), "endDate is required".to_string());
        }
        if self.organizer_id.is_none() {
            errors.insert(
                "organizerId".to_string(),
                "organizerId is required".to_string(),
            );
        }
        let capacity = match self.capacity {
            Some(c) if c >= 1 => Some(c),
            Some(_) => {
                errors.insert(
                    "capacity".to_string(),
                    "capacity must be at least 1".to_string(),
                );
                None
            }
            None => {
                errors.insert("capacity".to_string(), "capacity is required".to_string());
                None
            }
        };
        let base_price = match self.base_price {
            Some(p) if p > 0.0 => BigDecimal::from_f64(p),
            Some(_) => {
                errors.insert(
                    "basePrice".to_string(),
                    "basePrice must be positive".to_string(),
                );
                None
            }
            None => {
                errors.insert("basePrice".to_string(), "basePrice is required".to_string());
                None
            }
        };
        if let (Some(capacity), Some(available)) = (capacity, self.available_seats) {
            if available < 0 || available > capacity {
                errors.insert(
                    "availableSeats".to_string(),
                    "availableSeats must be between 0 and capacity".to_string(),
                );
            }
        }

        if !errors.is_empty() {
            return Err(EventServiceError::Validation(errors));
        }

        // All Nones were reported above.
        match (
            name,
            self.category,
            location,
            self.start_date,
            self.end_date,
            capacity,
            base_price,
            self.organizer_id,
        ) {
            (
                Some(name),
                Some(category),
                Some(location),
                Some(start_date),
                Some(end_date),
                Some(capacity),
                Some(base_price),
                Some(organizer_id),
            ) => Ok(NewEvent {
                name,
                description: self.description,
                category,
                location,
                start_date,
                end_date,
                capacity,
                available_seats: self.available_seats,
                base_price,
                organizer_id,
                image_url: self.image_url,
            }),
            _ => Err(EventServiceError::Validation(errors)),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/events", post(create_event).get(get_all_events))
        .route("/events/available", get(get_available_events))
        .route("/events/search", get(search_events))
        .route("/events/health", get(health_check))
        .route("/events/category/:category", get(get_events_by_category))
        .route(
            "/events/:id",
            get(get_event_by_id).put(update_event).delete(delete_event),
        )
        .route("/events/:id/publish", patch(publish_event))
        .route("/events/:id/cancel", patch(cancel_event))
        .route("/events/:id/reserve", post(reserve_seats))
        .route("/events/:id/release", post(release_seats))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), EventServiceError> {
    let new_event = request.validate()?;
    info!("POST /events - creating event: {}", new_event.name);
    let event = state.ledger.insert(new_event).await;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn get_all_events(State(state): State<AppState>) -> Json<Vec<Event>> {
    Json(state.ledger.list().await)
}

pub async fn get_available_events(State(state): State<AppState>) -> Json<Vec<Event>> {
    Json(state.ledger.list_available(Utc::now()).await)
}

pub async fn search_events(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Event>> {
    Json(state.ledger.search(&query.keyword).await)
}

pub async fn get_events_by_category(
    State(state): State<AppState>,
    Path(category): Path<EventCategory>,
) -> Json<Vec<Event>> {
    Json(state.ledger.by_category(category).await)
}

pub async fn get_event_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Event>, EventServiceError> {
    let event = state.ledger.get(id).await?;
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>, EventServiceError> {
    let base_price = match request.base_price {
        Some(p) if p > 0.0 => BigDecimal::from_f64(p),
        _ => None,
    };
    let update = EventUpdate {
        name: request.name,
        description: request.description,
        location: request.location,
        start_date: request.start_date,
        end_date: request.end_date,
        base_price,
        image_url: request.image_url,
    };
    let event = state.ledger.update(id, update).await?;
    Ok(Json(event))
}

pub async fn publish_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Event>, EventServiceError> {
    info!("PATCH /events/{}/publish", id);
    let event = state.ledger.publish(id).await?;
    Ok(Json(event))
}

pub async fn cancel_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Event>, EventServiceError> {
    info!("PATCH /events/{}/cancel", id);
    let event = state.ledger.cancel(id).await?;
    Ok(Json(event))
}

/// Called by the booking service before it persists a booking.
pub async fn reserve_seats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<SeatsQuery>,
) -> Result<Json<bool>, EventServiceError> {
    info!("POST /events/{}/reserve - {} seats", id, query.number_of_seats);
    let reserved = state.ledger.reserve(id, query.number_of_seats).await?;
    Ok(Json(reserved))
}

/// Called by the booking service when a booking is cancelled.
pub async fn release_seats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<SeatsQuery>,
) -> Result<StatusCode, EventServiceError> {
    info!("POST /events/{}/release - {} seats", id, query.number_of_seats);
    state.ledger.release(id, query.number_of_seats).await?;
    Ok(StatusCode::OK)
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, EventServiceError> {
    state.ledger.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health_check() -> &'static str {
    "Event Service is running"
}
