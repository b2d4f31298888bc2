use axum::{response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::{error::AppError, mailer};

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// `POST /api/contact` — contact-form submission.
///
/// All fields are required. The message is forwarded to the admin address
/// as a fire-and-forget email: delivery failures are logged and swallowed
/// and never fail this request.
#[tracing::instrument(skip(req), fields(subject = %req.subject))]
pub async fn submit(Json(req): Json<ContactRequest>) -> Result<impl IntoResponse, AppError> {
    let (name, email, subject, message) = (
        req.name.trim(),
        req.email.trim(),
        req.subject.trim(),
        req.message.trim(),
    );
    if name.is_empty() || email.is_empty() || subject.is_empty() || message.is_empty() {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }
    if !mailer::is_valid_email(email) {
        return Err(AppError::BadRequest("A valid email is required".to_string()));
    }

    tracing::info!(
        name,
        email,
        subject,
        message_len = message.len(),
        "Contact form submission"
    );

    let body = format!(
        "Name: {name}\nEmail: {email}\nSubject: {subject}\n\nMessage:\n{message}\n"
    );
    mailer::deliver_in_background(format!("Portfolio Contact: {subject}"), body);

    Ok(Json(json!({
        "data": {
            "ok": true,
            "message": "Your message has been received. We'll get back to you soon.",
        }
    })))
}
