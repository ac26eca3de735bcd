use std::sync::Arc;

use chrono::Utc;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingEvent, BookingStatus};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookingAction {
    Accept,
    Reject,
    Cancel,
    StartTravel,
    StartJob,
    Complete,
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Accept => "accept",
            BookingAction::Reject => "reject",
            BookingAction::Cancel => "cancel",
            BookingAction::StartTravel => "start_travel",
            BookingAction::StartJob => "start_job",
            BookingAction::Complete => "complete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accept" => Some(BookingAction::Accept),
            "reject" => Some(BookingAction::Reject),
            "cancel" => Some(BookingAction::Cancel),
            "start_travel" => Some(BookingAction::StartTravel),
            "start_job" => Some(BookingAction::StartJob),
            "complete" => Some(BookingAction::Complete),
            _ => None,
        }
    }
}

/// Which side of the booking is performing an action. The state machine
/// itself is actor-blind; the actor only decides who gets notified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Actor {
    Customer,
    Provider,
}

impl Actor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Actor::Customer => "customer",
            Actor::Provider => "provider",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Actor::Customer),
            "provider" => Some(Actor::Provider),
            _ => None,
        }
    }

    pub fn counterparty(&self) -> Actor {
        match self {
            Actor::Customer => Actor::Provider,
            Actor::Provider => Actor::Customer,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionError {
    pub from: BookingStatus,
    pub action: BookingAction,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cannot {} a booking that is {}",
            self.action.as_str(),
            self.from.as_str()
        )
    }
}

impl std::error::Error for TransitionError {}

/// The whole lifecycle in one closed table. Anything not listed — including
/// every pair starting from Completed or Cancelled — is rejected.
pub fn transition(
    current: BookingStatus,
    action: BookingAction,
) -> Result<BookingStatus, TransitionError> {
    let next = match (current, action) {
        (BookingStatus::Pending, BookingAction::Accept) => BookingStatus::Confirmed,
        (BookingStatus::Pending, BookingAction::Reject) => BookingStatus::Cancelled,
        (BookingStatus::Confirmed, BookingAction::Cancel) => BookingStatus::Cancelled,
        (BookingStatus::Confirmed, BookingAction::StartTravel) => BookingStatus::OnTheWay,
        (BookingStatus::OnTheWay, BookingAction::StartJob) => BookingStatus::InProgress,
        (BookingStatus::InProgress, BookingAction::Complete) => BookingStatus::Completed,
        _ => return Err(TransitionError { from: current, action }),
    };
    Ok(next)
}

/// Push copy keyed by the status being entered, phrased for the recipient.
pub fn notification_for(
    booking: &Booking,
    status: BookingStatus,
    recipient: Actor,
) -> (String, String) {
    let service = booking.service.label();
    let provider = booking.provider.name.as_str();
    let customer = booking.customer.name.as_str();

    match status {
        BookingStatus::Pending => (
            "New Booking Request".to_string(),
            format!("{customer} requested a {service}."),
        ),
        BookingStatus::Confirmed => (
            "Booking Confirmed".to_string(),
            format!("{provider} accepted your {service} booking."),
        ),
        BookingStatus::OnTheWay => (
            "Maid On The Way".to_string(),
            format!("{provider} is heading to your home for the {service}."),
        ),
        BookingStatus::InProgress => (
            "Cleaning Started".to_string(),
            format!("{provider} has started the {service}."),
        ),
        BookingStatus::Completed => (
            "Cleaning Completed".to_string(),
            format!("{provider} finished the {service}."),
        ),
        BookingStatus::Cancelled => match recipient {
            Actor::Customer => (
                "Booking Cancelled".to_string(),
                format!("{provider} cancelled your {service} booking."),
            ),
            Actor::Provider => (
                "Booking Cancelled".to_string(),
                format!("{customer} cancelled the {service} booking."),
            ),
        },
    }
}

/// Apply a lifecycle action end to end: validate the transition, persist it,
/// then notify the counter-party and publish a live event. The persistence
/// write happens before any side effect; if it fails, the transition never
/// happened. Notification failures are logged and swallowed.
pub async fn apply_action(
    state: &Arc<AppState>,
    booking_id: &str,
    action: BookingAction,
    actor: Actor,
) -> Result<Booking, AppError> {
    let booking = {
        let db = state.db.lock().unwrap();
        queries::get_booking_by_id(&db, booking_id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;

    let next = transition(booking.status, action)
        .map_err(|e| AppError::InvalidTransition(e.to_string()))?;

    let now = Utc::now().naive_utc();
    let completed_at =
        (next == BookingStatus::Completed && booking.is_recurring()).then_some(now);

    {
        let db = state.db.lock().unwrap();
        queries::update_booking_status(&db, &booking.id, &next, completed_at)?;
    }

    let mut updated = booking;
    updated.status = next;
    updated.updated_at = now;
    if completed_at.is_some() {
        updated.last_completed_date = completed_at;
    }

    tracing::info!(
        booking_id = %updated.id,
        action = action.as_str(),
        actor = actor.as_str(),
        status = next.as_str(),
        "booking transitioned"
    );

    notify_counterparty(state, &updated, actor).await;
    publish_event(state, &updated, Some(action), Some(actor));

    Ok(updated)
}

/// Sent when a customer files a new request, so the maid hears about it.
pub async fn notify_requested(state: &Arc<AppState>, booking: &Booking) {
    let (title, body) = notification_for(booking, BookingStatus::Pending, Actor::Provider);
    send_push(state, &booking.provider.id, booking, &title, &body).await;
}

async fn notify_counterparty(state: &Arc<AppState>, booking: &Booking, actor: Actor) {
    let recipient = actor.counterparty();
    let recipient_id = match recipient {
        Actor::Customer => &booking.customer.id,
        Actor::Provider => &booking.provider.id,
    };
    let (title, body) = notification_for(booking, booking.status, recipient);
    send_push(state, recipient_id, booking, &title, &body).await;
}

async fn send_push(
    state: &Arc<AppState>,
    user_id: &str,
    booking: &Booking,
    title: &str,
    body: &str,
) {
    let token = {
        let db = state.db.lock().unwrap();
        queries::get_device_token(&db, user_id)
    };

    let token = match token {
        Ok(Some(token)) => token,
        Ok(None) => {
            tracing::warn!(user_id, "no device token registered, skipping notification");
            return;
        }
        Err(e) => {
            tracing::error!(error = %e, user_id, "failed to load device token");
            return;
        }
    };

    let data = serde_json::json!({
        "booking_id": booking.id,
        "status": booking.status.as_str(),
    });

    if let Err(e) = state.notifier.notify(&token, title, body, &data).await {
        tracing::error!(error = %e, user_id, "failed to dispatch push notification");
    }
}

pub fn publish_event(
    state: &Arc<AppState>,
    booking: &Booking,
    action: Option<BookingAction>,
    actor: Option<Actor>,
) {
    let event = BookingEvent {
        booking_id: booking.id.clone(),
        status: booking.status.as_str().to_string(),
        action: action.map(|a| a.as_str().to_string()),
        actor: actor.map(|a| a.as_str().to_string()),
        occurred_at: Utc::now()
            .naive_utc()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    };
    // Ignore if no SSE subscribers are listening.
    let _ = state.events_tx.send(event);
}
