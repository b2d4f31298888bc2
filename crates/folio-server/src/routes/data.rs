use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use folio_core::summary::AnalyticsSummary;

use crate::state::AppState;

/// How many visit records the admin panel shows in its recent-visitors list.
const RECENT_VISITORS_LIMIT: i64 = 50;

/// `GET /api/analytics/data` — the admin dashboard payload: the 30-day
/// aggregate summary plus the 50 newest visit records.
///
/// Any internal failure collapses to a 500 carrying a fixed fallback
/// payload — an all-zero summary (with its full 14-entry histogram) and
/// an empty visitor list — so the admin panel always has something to
/// render. No retry, no partial results.
#[tracing::instrument(skip(state))]
pub async fn get_data(State(state): State<Arc<AppState>>) -> Response {
    // Make buffered visits visible: the summary is recomputed from the
    // store on every read.
    state.flush_buffer().await;

    match fetch_data(&state).await {
        Ok(data) => (StatusCode::OK, Json(json!({ "data": data }))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load analytics data");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": {
                        "code": "internal_error",
                        "message": "Failed to load analytics data",
                        "field": null
                    },
                    "data": {
                        "summary": AnalyticsSummary::empty(),
                        "recent_visitors": [],
                    }
                })),
            )
                .into_response()
        }
    }
}

async fn fetch_data(state: &AppState) -> anyhow::Result<serde_json::Value> {
    let summary = state.db.analytics_summary().await?;
    let recent_visitors = state.db.recent_visits(RECENT_VISITORS_LIMIT).await?;
    Ok(json!({
        "summary": summary,
        "recent_visitors": recent_visitors,
    }))
}
