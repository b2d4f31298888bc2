use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The payload the client sends to POST /api/analytics/track.
///
/// Everything else on the stored record — referrer source, browser,
/// device, geo fields — is derived server-side from request headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackPayload {
    pub path: String,
    /// Client-held session identifier; a fresh UUID is assigned when absent.
    pub session_id: Option<String>,
}

/// One logged page view, enriched and ready for storage.
///
/// `id` is unique per row; `visitor_id` is the day-salted digest shared by
/// all views from the same IP + User-Agent, and is what the summary's
/// distinct-visitor count is computed over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub id: String,
    pub visitor_id: String,
    pub session_id: String,
    pub path: String,
    /// Classified referrer source ("Direct", "Google", a bare domain, ...).
    pub referrer: String,
    pub browser: Option<String>,
    pub device: Option<String>,
    /// "City, CC" when the GeoIP lookup resolves a city, country otherwise.
    pub location: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}
