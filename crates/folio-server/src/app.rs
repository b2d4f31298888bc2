use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{auth, routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Admin routes are nested behind the bearer-token middleware; everything
/// else is public. Middleware is applied in outer-to-inner order
/// (outermost runs first on request, last on response):
///
/// 1. `TraceLayer` — structured request/response logging via `tracing`.
/// 2. `CorsLayer` — permissive CORS: the tracking calls come from the
///    portfolio pages themselves, which may be served from a different
///    origin than this API.
pub fn build_app(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/api/analytics/data", get(routes::data::get_data))
        .route(
            "/api/analytics/engagement",
            get(routes::engagement::get_engagement),
        )
        .route("/api/analytics/clear", post(routes::clear::clear))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::middleware::require_auth,
        ));

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/auth/login", post(auth::handlers::login))
        .route("/api/analytics/track", post(routes::track::track))
        .route("/api/engagement/click", post(routes::engagement::record_click))
        .route(
            "/api/engagement/session",
            post(routes::engagement::record_session),
        )
        .route("/api/contact", post(routes::contact::submit))
        .route("/api/notify-visit", post(routes::notify::notify_visit))
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
