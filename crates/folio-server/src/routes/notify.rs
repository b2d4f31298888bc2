use axum::{response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::mailer;

/// A loose visit descriptor as reported by the client. Every field is
/// optional; unknown visits still produce a notification.
#[derive(Debug, Deserialize)]
pub struct VisitNote {
    pub visitor_id: Option<String>,
    pub path: Option<String>,
    pub referrer: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub browser: Option<String>,
    pub device: Option<String>,
    pub timestamp: Option<String>,
}

/// `POST /api/notify-visit` — log a visit and email the admin about it.
///
/// Email delivery is fire-and-forget with the same swallow-on-failure
/// semantics as the contact form.
#[tracing::instrument(skip(note))]
pub async fn notify_visit(Json(note): Json<VisitNote>) -> impl IntoResponse {
    let time = note
        .timestamp
        .clone()
        .unwrap_or_else(|| Utc::now().to_rfc3339());
    let path = note.path.as_deref().unwrap_or("Homepage");
    let referrer = note.referrer.as_deref().unwrap_or("Direct");
    let location = note.location.as_deref().unwrap_or("Unknown");
    let country = note.country.as_deref().unwrap_or("Unknown");
    let browser = note.browser.as_deref().unwrap_or("Unknown");
    let device = note.device.as_deref().unwrap_or("Unknown");

    tracing::info!(
        visitor_id = note.visitor_id.as_deref().unwrap_or("unknown"),
        path,
        referrer,
        location,
        "New portfolio visit"
    );

    let body = format!(
        "New Portfolio Visit:\nTime: {time}\nPath: {path}\nLocation: {location}\n\
         Country: {country}\nBrowser: {browser}\nDevice: {device}\nReferrer: {referrer}\n"
    );
    mailer::deliver_in_background("New Portfolio Visit".to_string(), body);

    Json(json!({ "data": { "ok": true } }))
}
