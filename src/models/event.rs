use serde::Serialize;

/// Broadcast to SSE subscribers whenever a booking is created or its
/// lifecycle advances.
#[derive(Clone, Debug, Serialize)]
pub struct BookingEvent {
    pub booking_id: String,
    pub status: String,
    pub action: Option<String>,
    pub actor: Option<String>,
    pub occurred_at: String,
}
