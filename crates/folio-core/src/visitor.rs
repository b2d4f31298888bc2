use sha2::{Digest, Sha256};

/// Compute a visitor ID from IP and User-Agent.
///
/// Formula: sha256(salt_epoch + ip + user_agent)[0..8] encoded as 16 hex
/// chars. The salt_epoch = floor(unix_utc_timestamp / 86400) rotates daily
/// at midnight UTC, so the same browser maps to the same visitor within a
/// day without the raw IP ever being stored.
pub fn compute_visitor_id(ip: &str, user_agent: &str) -> String {
    let salt_epoch = chrono::Utc::now().timestamp() / 86400;
    let input = format!("{}{}{}", salt_epoch, ip, user_agent);
    let hash = Sha256::digest(input.as_bytes());
    // First 8 bytes → 16 hex characters.
    hex::encode(&hash[..8])
}

/// Classify a raw `Referer` header value into a referrer source.
///
/// - absent or empty → "Direct"
/// - unparseable URL → "Unknown"
/// - known domains collapse to a friendly name (google.com → "Google")
/// - everything else → the registrable domain ("news.ycombinator.com"
///   stays, "blog.example.co.uk" becomes "example.co.uk")
pub fn classify_referrer(referrer: Option<&str>) -> String {
    let raw = match referrer.map(str::trim) {
        None | Some("") => return "Direct".to_string(),
        Some(r) => r,
    };

    let host = match url::Url::parse(raw).ok().and_then(|u| u.host_str().map(str::to_lowercase)) {
        Some(h) => h,
        None => return "Unknown".to_string(),
    };

    // Reduce to the registrable domain so subdomains group together.
    let domain = psl::domain_str(&host).unwrap_or(&host).to_string();

    const KNOWN_SOURCES: &[(&str, &str)] = &[
        ("google", "Google"),
        ("bing", "Bing"),
        ("yahoo", "Yahoo"),
        ("facebook", "Facebook"),
        ("instagram", "Instagram"),
        ("twitter", "Twitter"),
        ("x.com", "Twitter"),
        ("linkedin", "LinkedIn"),
        ("github", "GitHub"),
        ("reddit", "Reddit"),
        ("youtube", "YouTube"),
    ];

    for (needle, source) in KNOWN_SOURCES {
        if domain.contains(needle) {
            return (*source).to_string();
        }
    }

    domain
}
