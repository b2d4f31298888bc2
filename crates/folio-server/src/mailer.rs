use std::time::Duration;

use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

/// Minimal address sanity check for contact-form submissions.
pub fn is_valid_email(target: &str) -> bool {
    let trimmed = target.trim();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
}

/// Deliver an email to the configured admin address.
///
/// Reads the relay configuration from the environment on each call:
/// `FOLIO_ADMIN_EMAIL`, `FOLIO_SMTP_HOST`, `FOLIO_SMTP_PORT`,
/// `FOLIO_SMTP_USERNAME`, `FOLIO_SMTP_PASSWORD`, `FOLIO_SMTP_FROM`.
///
/// When no admin address or no relay host is configured, the message is
/// logged instead of sent and the call succeeds — email is strictly
/// best-effort for this service. `FOLIO_SMTP_NOOP` short-circuits the
/// network dispatch for tests.
pub async fn deliver(subject: &str, body: String) -> Result<(), String> {
    let admin_email = match std::env::var("FOLIO_ADMIN_EMAIL") {
        Ok(v) if is_valid_email(&v) => v,
        _ => {
            info!(subject, body = %body, "No admin email configured; logging instead of sending");
            return Ok(());
        }
    };

    let smtp_noop_enabled = std::env::var("FOLIO_SMTP_NOOP")
        .ok()
        .map(|v| {
            let trimmed = v.trim();
            trimmed.eq_ignore_ascii_case("1")
                || trimmed.eq_ignore_ascii_case("true")
                || trimmed.eq_ignore_ascii_case("yes")
        })
        .unwrap_or(false);
    if smtp_noop_enabled {
        info!(
            target = %admin_email,
            subject,
            "SMTP noop transport enabled; marking delivery as sent without network dispatch"
        );
        return Ok(());
    }

    let host = match std::env::var("FOLIO_SMTP_HOST") {
        Ok(h) if !h.is_empty() => h,
        _ => {
            info!(subject, body = %body, "No SMTP relay configured; logging instead of sending");
            return Ok(());
        }
    };
    let port = std::env::var("FOLIO_SMTP_PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(587);
    let from_value =
        std::env::var("FOLIO_SMTP_FROM").unwrap_or_else(|_| "folio@localhost".to_string());
    let from: Mailbox = from_value
        .parse()
        .map_err(|_| "invalid FOLIO_SMTP_FROM".to_string())?;
    let to: Mailbox = admin_email
        .parse()
        .map_err(|_| "invalid admin email".to_string())?;
    let email = Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .body(body)
        .map_err(|e| format!("smtp message build failed: {e}"))?;

    let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        .port(port)
        .timeout(Some(Duration::from_secs(5)));
    if let (Ok(user), Ok(pass)) = (
        std::env::var("FOLIO_SMTP_USERNAME"),
        std::env::var("FOLIO_SMTP_PASSWORD"),
    ) {
        builder = builder.credentials(Credentials::new(user, pass));
    }
    let mailer = builder.build();
    mailer
        .send(email)
        .await
        .map_err(|e| format!("smtp send failed: {e}"))?;
    Ok(())
}

/// Spawn a fire-and-forget delivery task.
///
/// Failures are logged and swallowed — email never fails the triggering
/// request.
pub fn deliver_in_background(subject: String, body: String) {
    tokio::spawn(async move {
        if let Err(e) = deliver(&subject, body).await {
            tracing::warn!(subject = %subject, error = %e, "Email delivery failed");
        }
    });
}
