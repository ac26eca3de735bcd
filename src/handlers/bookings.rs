use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    validate_time_of_day, weekday_from_input, Booking, BookingStatus, Cadence, CustomerSnapshot,
    ProviderSnapshot, Schedule, ServiceKind,
};
use crate::services::lifecycle::{self, Actor, BookingAction};
use crate::services::schedule::next_scheduled_date;
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingResponse {
    id: String,
    customer: CustomerSnapshot,
    provider: ProviderSnapshot,
    service: String,
    schedule: Schedule,
    status: String,
    instructions: Option<String>,
    next_scheduled_date: String,
    last_completed_date: Option<String>,
    created_at: String,
    updated_at: String,
}

impl BookingResponse {
    fn from_booking(booking: Booking, today: NaiveDate) -> Self {
        let next = next_scheduled_date(&booking, today);
        Self {
            next_scheduled_date: next.format("%Y-%m-%d %H:%M:%S").to_string(),
            last_completed_date: booking
                .last_completed_date
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            id: booking.id,
            customer: booking.customer,
            provider: booking.provider,
            service: booking.service.as_str().to_string(),
            schedule: booking.schedule,
            status: booking.status.as_str().to_string(),
            instructions: booking.instructions,
            created_at: booking.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            updated_at: booking.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// POST /api/bookings
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub customer: CustomerSnapshot,
    pub provider: ProviderSnapshot,
    pub service: String,
    pub schedule: ScheduleRequest,
    pub instructions: Option<String>,
}

/// Raw schedule input, validated strictly before a booking is stored.
#[derive(Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScheduleRequest {
    OneTime { date: String, time: String },
    Recurring { cadence: String, day: String, hour: String },
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let service =
        ServiceKind::from_input(&body.service).map_err(|e| AppError::Validation(e.to_string()))?;

    let schedule = match body.schedule {
        ScheduleRequest::OneTime { date, time } => {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|_| AppError::Validation(format!("invalid booking date: {date}")))?;
            validate_time_of_day(&time).map_err(|e| AppError::Validation(e.to_string()))?;
            Schedule::OneTime { date, time }
        }
        ScheduleRequest::Recurring { cadence, day, hour } => {
            let cadence =
                Cadence::from_input(&cadence).map_err(|e| AppError::Validation(e.to_string()))?;
            weekday_from_input(&day).map_err(|e| AppError::Validation(e.to_string()))?;
            validate_time_of_day(&hour).map_err(|e| AppError::Validation(e.to_string()))?;
            Schedule::Recurring {
                cadence,
                day: day.to_lowercase(),
                hour,
            }
        }
    };

    if body.customer.id.trim().is_empty() || body.provider.id.trim().is_empty() {
        return Err(AppError::Validation(
            "customer and provider ids are required".to_string(),
        ));
    }

    let now = Utc::now().naive_utc();
    let booking = Booking {
        id: uuid::Uuid::new_v4().to_string(),
        customer: body.customer,
        provider: body.provider,
        service,
        schedule,
        last_completed_date: None,
        status: BookingStatus::Pending,
        instructions: body.instructions,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db.lock().unwrap();
        queries::create_booking(&db, &booking)?;
    }

    tracing::info!(booking_id = %booking.id, service = booking.service.as_str(), "booking created");

    lifecycle::notify_requested(&state, &booking).await;
    lifecycle::publish_event(&state, &booking, None, None);

    let response = BookingResponse::from_booking(booking, Utc::now().date_naive());
    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub customer_id: Option<String>,
    pub provider_id: Option<String>,
    pub limit: Option<i64>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = {
        let db = state.db.lock().unwrap();
        queries::list_bookings(
            &db,
            &queries::BookingFilter {
                status: query.status.as_deref(),
                customer_id: query.customer_id.as_deref(),
                provider_id: query.provider_id.as_deref(),
                limit: query.limit.unwrap_or(50),
            },
        )?
    };

    let today = Utc::now().date_naive();
    let response: Vec<BookingResponse> = bookings
        .into_iter()
        .map(|b| BookingResponse::from_booking(b, today))
        .collect();

    Ok(Json(response))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = {
        let db = state.db.lock().unwrap();
        queries::get_booking_by_id(&db, &id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    Ok(Json(BookingResponse::from_booking(
        booking,
        Utc::now().date_naive(),
    )))
}

// POST /api/bookings/:id/transition
#[derive(Deserialize)]
pub struct TransitionRequest {
    pub action: String,
    pub actor: String,
}

pub async fn transition_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let action = BookingAction::parse(&body.action)
        .ok_or_else(|| AppError::Validation(format!("unknown action: {}", body.action)))?;
    let actor = Actor::parse(&body.actor)
        .ok_or_else(|| AppError::Validation(format!("unknown actor: {}", body.actor)))?;

    let updated = lifecycle::apply_action(&state, &id, action, actor).await?;

    Ok(Json(BookingResponse::from_booking(
        updated,
        Utc::now().date_naive(),
    )))
}
