use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::state::AppState;

// POST /api/devices
#[derive(Deserialize)]
pub struct RegisterDeviceRequest {
    pub user_id: String,
    pub token: String,
}

pub async fn register_device(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterDeviceRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = body.user_id.trim().to_string();
    let token = body.token.trim().to_string();

    if user_id.is_empty() || token.is_empty() {
        return Err(AppError::Validation(
            "user_id and token are required".to_string(),
        ));
    }

    {
        let db = state.db.lock().unwrap();
        queries::save_device_token(&db, &user_id, &token)?;
    }

    Ok(Json(serde_json::json!({"ok": true})))
}
