use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    Music,
    Sport,
    Culture,
    Conference,
    Theater,
    Other,
}

/// An event and its seat inventory.
///
/// `capacity` is fixed at creation; `available_seats` is only ever mutated
/// through [`Event::reserve_seats`] and [`Event::release_seats`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: EventCategory,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub capacity: i32,
    pub available_seats: i32,
    pub base_price: BigDecimal,
    pub status: EventStatus,
    pub organizer_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for inserting a new event into the ledger.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub category: EventCategory,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub capacity: i32,
    pub available_seats: Option<i32>,
    pub base_price: BigDecimal,
    pub organizer_id: i64,
    pub image_url: Option<String>,
}

/// Partial update of an event's descriptive fields.
///
/// Capacity and seat availability are absent: capacity is immutable and
/// availability moves only through reserve/release.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub base_price: Option<BigDecimal>,
    pub image_url: Option<String>,
}

impl Event {
    pub fn has_available_seats(&self) -> bool {
        self.available_seats > 0
    }

    /// Guarded decrement: succeeds only when enough seats remain.
    pub fn reserve_seats(&mut self, count: i32) -> bool {
        if count >= 1 && self.available_seats >= count {
            self.available_seats -= count;
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    /// Unconditional increment. Does not validate against an outstanding
    /// reservation, so a stray release can push availability past capacity.
    pub fn release_seats(&mut self, count: i32) {
        self.available_seats += count;
        self.updated_at = Utc::now();
        if self.available_seats > self.capacity {
            tracing::warn!(
                event_id = self.id,
                available = self.available_seats,
                capacity = self.capacity,
                "seat release pushed availability past capacity"
            );
        }
    }

    pub fn publish(&mut self) {
        self.status = EventStatus::Published;
        self.updated_at = Utc::now();
    }

    pub fn cancel(&mut self) {
        self.status = EventStatus::Cancelled;
        self.updated_at = Utc::now();
    }

    pub fn apply_update(&mut self, update: EventUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(start_date) = update.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            self.end_date = end_date;
        }
        if let Some(base_price) = update.base_price {
            self.base_price = base_price;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        self.updated_at = Utc::now();
    }
}
