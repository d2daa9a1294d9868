//! Booking lifecycle: PENDING -> CONFIRMED, PENDING/CONFIRMED -> CANCELLED.
//!
//! Creation and cancellation bracket the remote seat protocol
//! asymmetrically: a declined reservation blocks creation outright, while
//! a failed release never blocks cancellation. The local state change
//! always wins and the seat correction is best effort.

use std::sync::Arc;

use tracing::info;

use crate::client::EventServiceClient;
use crate::error::BookingError;
use crate::models::{Booking, BookingStatus, NewBooking};
use crate::store::BookingStore;

pub struct BookingService {
    store: Arc<BookingStore>,
    events: Arc<dyn EventServiceClient>,
}

impl BookingService {
    pub fn new(store: Arc<BookingStore>, events: Arc<dyn EventServiceClient>) -> Self {
        Self { store, events }
    }

    /// Reserves seats on the event service, then persists the booking.
    /// Nothing is persisted when the reservation is declined, whatever the
    /// reason on the other side.
    pub async fn create_booking(&self, new: NewBooking) -> Result<Booking, BookingError> {
        let reserved = self
            .events
            .reserve_seats(new.event_id, new.number_of_tickets)
            .await;
        if !reserved {
            return Err(BookingError::ReservationFailed {
                event_id: new.event_id,
                seats: new.number_of_tickets,
            });
        }

        let booking = self.store.insert(new).await;
        info!(
            booking_id = booking.id,
            booking_code = %booking.booking_code,
            event_id = booking.event_id,
            "booking created"
        );
        Ok(booking)
    }

    pub async fn get_booking(&self, id: i64) -> Result<Booking, BookingError> {
        self.store.get(id).await.ok_or(BookingError::NotFound(id))
    }

    pub async fn list_bookings(&self) -> Vec<Booking> {
        self.store.list().await
    }

    pub async fn confirm_booking(&self, id: i64) -> Result<Booking, BookingError> {
        let mut booking = self.get_booking(id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(BookingError::NotConfirmable(id));
        }
        booking.confirm();
        self.store.save(booking.clone()).await;
        Ok(booking)
    }

    /// Releases the reserved seats and cancels the booking. The release is
    /// fire-and-forget: its failure is logged inside the client, and the
    /// booking still transitions to CANCELLED.
    pub async fn cancel_booking(&self, id: i64) -> Result<Booking, BookingError> {
        let mut booking = self.get_booking(id).await?;
        if !booking.can_be_cancelled() {
            return Err(BookingError::NotCancellable(id));
        }

        self.events
            .release_seats(booking.event_id, booking.number_of_tickets)
            .await;

        booking.cancel();
        self.store.save(booking.clone()).await;
        info!(booking_id = booking.id, "booking cancelled");
        Ok(booking)
    }
}
