use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::state::AppState;

use super::jwt::decode_jwt;

/// Require a valid admin bearer token on the wrapped routes.
///
/// The token comes from `Authorization: Bearer <token>` and is accepted
/// iff its signature and expiry both validate against the per-install
/// secret. Expired and forged tokens both produce the same 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::to_string);

    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => return unauthorized_response(),
    };

    let jwt_secret = match state.db.get_setting("jwt_secret").await {
        Ok(Some(secret)) => secret,
        Ok(None) => return unauthorized_response(),
        Err(e) => {
            tracing::error!(error = %e, "JWT secret lookup failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if decode_jwt(&token, &jwt_secret).is_err() {
        return unauthorized_response();
    }

    next.run(request).await
}

fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": {
                "code": "unauthorized",
                "message": "Not authenticated",
                "field": null
            }
        })),
    )
        .into_response()
}
