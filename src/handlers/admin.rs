use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/admin/stats
#[derive(Serialize)]
pub struct StatsResponse {
    pending_count: i64,
    confirmed_count: i64,
    active_count: i64,
    completed_count: i64,
    cancelled_count: i64,
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let stats = {
        let db = state.db.lock().unwrap();
        queries::get_dashboard_stats(&db)?
    };

    Ok(Json(StatsResponse {
        pending_count: stats.pending_count,
        confirmed_count: stats.confirmed_count,
        active_count: stats.active_count,
        completed_count: stats.completed_count,
        cancelled_count: stats.cancelled_count,
    }))
}
