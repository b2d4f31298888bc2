use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use folio_core::{
    visit::{TrackPayload, Visit},
    visitor::{classify_referrer, compute_visitor_id},
};

use crate::{error::AppError, state::AppState};

/// `POST /api/analytics/track` — log one page view.
///
/// ## Auth
/// None required; this is the endpoint the public site calls on every
/// page load.
///
/// ## Rate limiting
/// 60 req/min per IP, sliding window; excess requests get 429.
///
/// ## Enrichment
/// - `visitor_id`: `sha256(salt_epoch + ip + user_agent)[0..8]` → 16 hex chars.
/// - `referrer`: the `Referer` header classified to a source
///   ("Direct" when absent, "Google"/"GitHub"/... for known domains).
/// - `browser`, `device`: UA parsing via `woothee`.
/// - `location`, `country`: GeoIP via `maxminddb`; loopback addresses map
///   to "Local Development" / "Local"; a missing database is non-fatal
///   and leaves the geo fields empty.
///
/// ## Response
/// `202 Accepted` with `{ "ok": true }`. The visit lands in the in-memory
/// buffer and is persisted by the flush task.
#[tracing::instrument(skip(state, headers, payload))]
pub async fn track(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<TrackPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.path.is_empty() {
        return Err(AppError::BadRequest("path is required".to_string()));
    }

    let client_ip = extract_client_ip(&headers);

    if !state.check_rate_limit(&client_ip).await {
        return Err(AppError::RateLimited);
    }

    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let referrer = headers
        .get(axum::http::header::REFERER)
        .and_then(|v| v.to_str().ok());

    let geo = lookup_geo(&state.config.geoip_path, &client_ip);
    let ua_info = parse_user_agent(&user_agent);

    let visit = Visit {
        id: uuid::Uuid::new_v4().to_string(),
        visitor_id: compute_visitor_id(&client_ip, &user_agent),
        session_id: payload
            .session_id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        path: payload.path,
        referrer: classify_referrer(referrer),
        browser: ua_info.as_ref().map(|u| u.browser.clone()),
        device: ua_info.as_ref().map(|u| u.device.clone()),
        location: geo.as_ref().and_then(|g| g.location.clone()),
        country: geo.as_ref().and_then(|g| g.country.clone()),
        created_at: Utc::now(),
    };

    state.push_visits(vec![visit]).await;

    Ok((
        axum::http::StatusCode::ACCEPTED,
        Json(json!({ "ok": true })),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Extract the real client IP from `X-Forwarded-For` (first entry) or
/// `X-Real-IP`, falling back to loopback when neither is present (direct
/// local requests).
pub fn extract_client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_string())
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

/// GeoIP result for a visit.
struct GeoInfo {
    location: Option<String>,
    country: Option<String>,
}

/// Attempt a GeoIP lookup for `ip` using the MaxMind database at `path`.
///
/// Loopback addresses short-circuit to a local marker so development
/// traffic is recognisable in the admin panel. Returns `None` if the
/// database file is missing or the IP cannot be parsed — visits are
/// stored with empty geo fields rather than failing the request.
fn lookup_geo(path: &str, ip: &str) -> Option<GeoInfo> {
    use std::net::IpAddr;
    use std::str::FromStr;

    if ip == "127.0.0.1" || ip == "::1" {
        return Some(GeoInfo {
            location: Some("Local Development".to_string()),
            country: Some("Local".to_string()),
        });
    }

    if !std::path::Path::new(path).exists() {
        // Database absent — non-fatal. Warning already logged at startup.
        return None;
    }

    let reader = maxminddb::Reader::open_readfile(path).ok()?;
    let ip_addr = IpAddr::from_str(ip).ok()?;

    let record: maxminddb::geoip2::City = reader.lookup(ip_addr).ok()?;

    let country = record
        .country
        .as_ref()
        .and_then(|c| c.iso_code)
        .map(|s| s.to_string());

    let city = record
        .city
        .as_ref()
        .and_then(|c| c.names.as_ref())
        .and_then(|names| names.get("en"))
        .map(|s| s.to_string());

    let location = match (&city, &country) {
        (Some(city), Some(country)) => Some(format!("{city}, {country}")),
        (None, Some(country)) => Some(country.clone()),
        _ => None,
    };

    Some(GeoInfo { location, country })
}

/// Parsed User-Agent fields.
struct UaInfo {
    browser: String,
    device: String,
}

/// Parse a `User-Agent` string via the `woothee` crate.
///
/// Returns `None` if the UA string is empty or `woothee` cannot classify it.
fn parse_user_agent(user_agent: &str) -> Option<UaInfo> {
    if user_agent.is_empty() {
        return None;
    }

    let result = woothee::parser::Parser::new().parse(user_agent)?;

    // woothee `category` maps to our device convention:
    //   "pc"         → "desktop"
    //   "smartphone" → "mobile"
    //   "mobilephone"→ "mobile"
    //   "tablet"     → "tablet"
    //   everything else → "desktop" (conservative default)
    let device = match result.category {
        "smartphone" | "mobilephone" => "mobile",
        "tablet" => "tablet",
        _ => "desktop",
    }
    .to_string();

    Some(UaInfo {
        browser: result.name.to_string(),
        device,
    })
}
