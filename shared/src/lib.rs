use serde::{Deserialize, Serialize};

/// Event summary as exchanged over the seat-reservation contract.
///
/// The event service serves a richer document for `GET /events/{id}`;
/// the booking side only relies on the fields below and ignores the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub available_seats: i32,
}

/// Query parameters for `POST /events/{id}/reserve` and `/release`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatsQuery {
    pub number_of_seats: i32,
}
