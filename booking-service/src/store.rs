//! In-process booking storage.
//!
//! A plain map behind one `RwLock`: bookings are written rarely and the
//! remote reservation call never happens under this lock, so whole-map
//! locking is enough of a transaction boundary here.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{generate_booking_code, Booking, BookingStatus, NewBooking};

#[derive(Debug)]
pub struct BookingStore {
    bookings: RwLock<HashMap<i64, Booking>>,
    next_id: AtomicI64,
}

impl Default for BookingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingStore {
    pub fn new() -> Self {
        Self {
            bookings: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Persists a new PENDING booking, assigning id, booking code and
    /// creation timestamps.
    pub async fn insert(&self, new: NewBooking) -> Booking {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let booking = Booking {
            id,
            booking_code: generate_booking_code(),
            event_id: new.event_id,
            user_id: new.user_id,
            number_of_tickets: new.number_of_tickets,
            total_price: new.total_price,
            status: BookingStatus::Pending,
            user_email: new.user_email,
            event_name: new.event_name,
            event_date: new.event_date,
            notes: new.notes,
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            cancelled_at: None,
        };
        let mut map = self.bookings.write().await;
        map.insert(id, booking.clone());
        booking
    }

    pub async fn get(&self, id: i64) -> Option<Booking> {
        let map = self.bookings.read().await;
        map.get(&id).cloned()
    }

    pub async fn list(&self) -> Vec<Booking> {
        let map = self.bookings.read().await;
        let mut bookings: Vec<_> = map.values().cloned().collect();
        bookings.sort_by_key(|b| b.id);
        bookings
    }

    pub async fn save(&self, booking: Booking) {
        let mut map = self.bookings.write().await;
        map.insert(booking.id, booking);
    }

    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bookings.read().await.is_empty()
    }
}
