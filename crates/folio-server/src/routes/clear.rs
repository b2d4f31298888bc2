use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ClearRequest {
    /// When present, a zeroed aggregate row is re-created for this user so
    /// their identifier survives the wipe.
    pub user_id: Option<String>,
}

/// `POST /api/analytics/clear` — wipe all visit records and engagement
/// counters back to their initial zero state.
#[tracing::instrument(skip(state, payload))]
pub async fn clear(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<ClearRequest>>,
) -> Result<impl IntoResponse, AppError> {
    // Drop anything still buffered so it cannot be flushed back in after
    // the wipe.
    {
        let mut buf = state.buffer.lock().await;
        buf.clear();
    }

    let req = payload.map(|Json(r)| r).unwrap_or_default();
    let keep_user = req.user_id.as_deref().filter(|s| !s.is_empty());

    state
        .db
        .clear_all(keep_user, Utc::now())
        .await
        .map_err(AppError::Internal)?;

    tracing::info!(kept_user = keep_user.unwrap_or("none"), "Analytics data cleared");

    Ok(Json(json!({ "ok": true })))
}
