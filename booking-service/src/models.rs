use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Refunded,
}

/// A ticket booking. References its event by value only: the event lives
/// in a different service and consistency is maintained through the
/// reserve/release protocol, never a shared transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub booking_code: String,
    pub event_id: i64,
    pub user_id: i64,
    pub number_of_tickets: i32,
    pub total_price: BigDecimal,
    pub status: BookingStatus,
    pub user_email: String,
    // Denormalized for display without a remote call.
    pub event_name: String,
    pub event_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Payload for persisting a booking after a successful seat reservation.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub event_id: i64,
    pub user_id: i64,
    pub number_of_tickets: i32,
    pub total_price: BigDecimal,
    pub user_email: String,
    pub event_name: String,
    pub event_date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl Booking {
    pub fn can_be_cancelled(&self) -> bool {
        matches!(self.status, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn confirm(&mut self) {
        let now = Utc::now();
        self.status = BookingStatus::Confirmed;
        self.confirmed_at = Some(now);
        self.updated_at = now;
    }

    pub fn cancel(&mut self) {
        let now = Utc::now();
        self.status = BookingStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.updated_at = now;
    }
}

/// Booking code in the `BK-<YYYYMMDD>-<4-digit-random>` format.
/// Collisions are not checked.
pub fn generate_booking_code() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("BK-{date}-{suffix:04}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_code_format() {
        let code = generate_booking_code();
        assert_eq!(code.len(), "BK-20260101-0000".len());
        assert!(code.starts_with("BK-"));
        let suffix = code.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }
}
