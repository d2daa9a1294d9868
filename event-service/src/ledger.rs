//! Authoritative seat-count store, one entry per event.
//!
//! Events live in a `HashMap` behind an outer `RwLock`, each entry behind
//! its own `RwLock`. Reads on the same event run concurrently, writes on
//! different events run concurrently, and writes on the same event are
//! serialized: `reserve` is a check-then-decrement with no window for a
//! lost update.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::EventServiceError;
use crate::models::{Event, EventCategory, EventStatus, EventUpdate, NewEvent};

#[derive(Debug)]
pub struct InventoryLedger {
    events: RwLock<HashMap<i64, Arc<RwLock<Event>>>>,
    next_id: AtomicI64,
}

impl Default for InventoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Inserts a new event, assigning its id and stamping timestamps.
    /// Availability defaults to the full capacity when not supplied.
    pub async fn insert(&self, new: NewEvent) -> Event {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let event = Event {
            id,
            name: new.name,
            description: new.description,
            category: new.category,
            location: new.location,
            start_date: new.start_date,
            end_date: new.end_date,
            capacity: new.capacity,
            available_seats: new.available_seats.unwrap_or(new.capacity),
            base_price: new.base_price,
            status: EventStatus::Draft,
            organizer_id: new.organizer_id,
            image_url: new.image_url,
            created_at: now,
            updated_at: now,
        };
        let mut map = self.events.write().await;
        map.insert(id, Arc::new(RwLock::new(event.clone())));
        event
    }

    async fn entry(&self, id: i64) -> Result<Arc<RwLock<Event>>, EventServiceError> {
        let map = self.events.read().await;
        map.get(&id).cloned().ok_or(EventServiceError::NotFound(id))
    }

    pub async fn get(&self, id: i64) -> Result<Event, EventServiceError> {
        let entry = self.entry(id).await?;
        let event = entry.read().await;
        Ok(event.clone())
    }

    pub async fn list(&self) -> Vec<Event> {
        let map = self.events.read().await;
        let mut events = Vec::with_capacity(map.len());
        for entry in map.values() {
            events.push(entry.read().await.clone());
        }
        events.sort_by_key(|e| e.id);
        events
    }

    /// Published events that still have seats and start in the future.
    pub async fn list_available(&self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = self.list().await;
        events.retain(|e| {
            e.status == EventStatus::Published && e.has_available_seats() && e.start_date > now
        });
        events
    }

    /// Case-insensitive keyword match on name and description.
    pub async fn search(&self, keyword: &str) -> Vec<Event> {
        let needle = keyword.to_lowercase();
        let mut events = self.list().await;
        events.retain(|e| {
            e.name.to_lowercase().contains(&needle)
                || e.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        });
        events
    }

    pub async fn by_category(&self, category: EventCategory) -> Vec<Event> {
        let mut events = self.list().await;
        events.retain(|e| e.category == category);
        events
    }

    pub async fn update(&self, id: i64, update: EventUpdate) -> Result<Event, EventServiceError> {
        let entry = self.entry(id).await?;
        let mut event = entry.write().await;
        event.apply_update(update);
        Ok(event.clone())
    }

    pub async fn publish(&self, id: i64) -> Result<Event, EventServiceError> {
        let entry = self.entry(id).await?;
        let mut event = entry.write().await;
        event.publish();
        Ok(event.clone())
    }

    pub async fn cancel(&self, id: i64) -> Result<Event, EventServiceError> {
        let entry = self.entry(id).await?;
        let mut event = entry.write().await;
        event.cancel();
        Ok(event.clone())
    }

    pub async fn remove(&self, id: i64) -> Result<(), EventServiceError> {
        let mut map = self.events.write().await;
        map.remove(&id)
            .map(|_| ())
            .ok_or(EventServiceError::NotFound(id))
    }

    /// Atomically reserves seats: the check and the decrement happen under
    /// the event's write lock, so concurrent callers can never jointly
    /// overdraw the counter. Returns `Ok(false)` without mutation when the
    /// request cannot be satisfied.
    pub async fn reserve(&self, id: i64, count: i32) -> Result<bool, EventServiceError> {
        let entry = self.entry(id).await?;
        let mut event = entry.write().await;
        Ok(event.reserve_seats(count))
    }

    /// Unconditionally returns seats to the pool.
    pub async fn release(&self, id: i64, count: i32) -> Result<(), EventServiceError> {
        let entry = self.entry(id).await?;
        let mut event = entry.write().await;
        event.release_seats(count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::Duration;

    fn new_event(capacity: i32) -> NewEvent {
        NewEvent {
            name: "Rustfest".to_string(),
            description: Some("A conference about Rust".to_string()),
            category: EventCategory::Conference,
            location: "Berlin".to_string(),
            start_date: Utc::now() + Duration::days(30),
            end_date: Utc::now() + Duration::days(31),
            capacity,
            available_seats: None,
            base_price: BigDecimal::from(25),
            organizer_id: 7,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn insert_defaults_availability_to_capacity() {
        let ledger = InventoryLedger::new();
        let event = ledger.insert(new_event(100)).await;
        assert_eq!(event.id, 1);
        assert_eq!(event.available_seats, 100);
        assert_eq!(event.status, EventStatus::Draft);

        let second = ledger.insert(new_event(10)).await;
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn reserve_decrements_until_exhausted() {
        let ledger = InventoryLedger::new();
        let event = ledger.insert(new_event(5)).await;

        assert!(ledger.reserve(event.id, 3).await.unwrap());
        assert!(ledger.reserve(event.id, 2).await.unwrap());
        assert!(!ledger.reserve(event.id, 1).await.unwrap());
        assert_eq!(ledger.get(event.id).await.unwrap().available_seats, 0);
    }

    #[tokio::test]
    async fn reserve_fails_closed_without_mutation() {
        let ledger = InventoryLedger::new();
        let event = ledger.insert(new_event(1)).await;

        assert!(!ledger.reserve(event.id, 2).await.unwrap());
        assert_eq!(ledger.get(event.id).await.unwrap().available_seats, 1);
    }

    #[tokio::test]
    async fn reserve_rejects_non_positive_counts() {
        let ledger = InventoryLedger::new();
        let event = ledger.insert(new_event(5)).await;

        assert!(!ledger.reserve(event.id, 0).await.unwrap());
        assert!(!ledger.reserve(event.id, -3).await.unwrap());
        assert_eq!(ledger.get(event.id).await.unwrap().available_seats, 5);
    }

    #[tokio::test]
    async fn reserve_unknown_event_is_not_found() {
        let ledger = InventoryLedger::new();
        assert!(matches!(
            ledger.reserve(99, 1).await,
            Err(EventServiceError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn concurrent_reserves_never_overdraw() {
        let ledger = Arc::new(InventoryLedger::new());
        let event = ledger.insert(new_event(5)).await;

        let attempts = (0..20).map(|_| {
            let ledger = Arc::clone(&ledger);
            let id = event.id;
            tokio::spawn(async move { ledger.reserve(id, 1).await.unwrap() })
        });
        let outcomes = futures::future::join_all(attempts).await;
        let granted = outcomes
            .into_iter()
            .filter(|r| *r.as_ref().unwrap())
            .count();

        assert_eq!(granted, 5);
        assert_eq!(ledger.get(event.id).await.unwrap().available_seats, 0);
    }

    #[tokio::test]
    async fn release_is_unguarded() {
        let ledger = InventoryLedger::new();
        let event = ledger.insert(new_event(5)).await;

        // A release with no matching reservation exceeds capacity.
        ledger.release(event.id, 3).await.unwrap();
        assert_eq!(ledger.get(event.id).await.unwrap().available_seats, 8);
    }

    #[tokio::test]
    async fn release_unknown_event_is_not_found() {
        let ledger = InventoryLedger::new();
        assert!(matches!(
            ledger.release(42, 1).await,
            Err(EventServiceError::NotFound(42))
        ));
    }

    #[tokio::test]
    async fn status_transitions_do_not_touch_seats() {
        let ledger = InventoryLedger::new();
        let event = ledger.insert(new_event(5)).await;

        let published = ledger.publish(event.id).await.unwrap();
        assert_eq!(published.status, EventStatus::Published);
        assert_eq!(published.available_seats, 5);

        let cancelled = ledger.cancel(event.id).await.unwrap();
        assert_eq!(cancelled.status, EventStatus::Cancelled);
        assert_eq!(cancelled.available_seats, 5);
    }

    #[tokio::test]
    async fn update_leaves_capacity_and_availability_alone() {
        let ledger = InventoryLedger::new();
        let event = ledger.insert(new_event(5)).await;
        ledger.reserve(event.id, 2).await.unwrap();

        let updated = ledger
            .update(
                event.id,
                EventUpdate {
                    name: Some("Rustfest 2026".to_string()),
                    location: Some("Amsterdam".to_string()),
                    ..EventUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Rustfest 2026");
        assert_eq!(updated.capacity, 5);
        assert_eq!(updated.available_seats, 3);
    }

    #[tokio::test]
    async fn list_available_filters_unpublished_and_sold_out() {
        let ledger = InventoryLedger::new();
        let draft = ledger.insert(new_event(5)).await;
        let published = ledger.insert(new_event(5)).await;
        let sold_out = ledger.insert(new_event(1)).await;

        ledger.publish(published.id).await.unwrap();
        ledger.publish(sold_out.id).await.unwrap();
        ledger.reserve(sold_out.id, 1).await.unwrap();

        let available = ledger.list_available(Utc::now()).await;
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, published.id);
        assert_ne!(available[0].id, draft.id);
    }
}
