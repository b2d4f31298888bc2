use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use folio_core::config::AdminAuth;

use crate::{error::AppError, state::AppState};

use super::jwt::encode_jwt;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// `POST /api/auth/login` — exchange the shared admin secret for a
/// bearer token.
///
/// The token is returned in the response body (the admin client keeps it
/// in local storage and presents it via `Authorization: Bearer`).
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.password.is_empty() {
        return Err(AppError::BadRequest("password is required".to_string()));
    }

    let expected = match &state.config.admin_auth {
        AdminAuth::Password(pw) => pw,
        AdminAuth::Disabled => {
            tracing::warn!("Login attempt while FOLIO_ADMIN_PASSWORD is unset");
            return Err(AppError::Unauthorized);
        }
    };

    if req.password != *expected {
        return Err(AppError::Unauthorized);
    }

    let jwt_secret = state
        .db
        .ensure_jwt_secret()
        .await
        .map_err(AppError::Internal)?;
    let (token, expires_at) =
        encode_jwt(&jwt_secret, state.config.token_hours).map_err(AppError::Internal)?;

    Ok(Json(json!({
        "data": {
            "token": token,
            "expires_at": expires_at,
        }
    })))
}
