use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use folio_core::engagement::{ClickPayload, SessionPayload};

use crate::{error::AppError, state::AppState};

/// `POST /api/engagement/click` — increment one click counter.
///
/// Public; the site calls this from its tracked links, navigation items,
/// and project cards. The per-user aggregate row is created on first
/// contact.
#[tracing::instrument(skip(state, payload))]
pub async fn record_click(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ClickPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.user_id.is_empty() {
        return Err(AppError::BadRequest("user_id is required".to_string()));
    }
    if payload.target_id.is_empty() {
        return Err(AppError::BadRequest("target_id is required".to_string()));
    }

    state
        .db
        .record_click(&payload, Utc::now())
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(json!({ "ok": true })))
}

/// `POST /api/engagement/session` — record a finished session.
///
/// Public; sent by the site when a session ends. Updates the per-user
/// aggregate and appends a duration sample (capped to the most recent
/// 100 per user).
#[tracing::instrument(skip(state, payload))]
pub async fn record_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SessionPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.user_id.is_empty() {
        return Err(AppError::BadRequest("user_id is required".to_string()));
    }
    if payload.session_id.is_empty() {
        return Err(AppError::BadRequest("session_id is required".to_string()));
    }
    if !payload.duration_seconds.is_finite() || payload.duration_seconds < 0.0 {
        return Err(AppError::BadRequest(
            "duration_seconds must be a non-negative number".to_string(),
        ));
    }

    state
        .db
        .record_session(&payload, Utc::now())
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(json!({ "ok": true })))
}

/// `GET /api/analytics/engagement` — the admin engagement report:
/// per-user aggregates, merged click counters per kind, and session
/// statistics recomputed from the stored samples.
#[tracing::instrument(skip(state))]
pub async fn get_engagement(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let report = state
        .db
        .engagement_report()
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(json!({ "data": report })))
}
