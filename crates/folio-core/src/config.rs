use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// `None` means no data directory was configured — the server falls
    /// back to an in-memory database with no durability across restarts.
    pub data_dir: Option<String>,
    pub geoip_path: String,
    pub admin_auth: AdminAuth,
    pub token_hours: u32,
    pub cors_origins: Vec<String>,
    pub buffer_flush_interval_ms: u64,
    pub buffer_max_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminAuth {
    /// Holds the plaintext shared secret read from `FOLIO_ADMIN_PASSWORD`.
    Password(String),
    /// No password configured — every login attempt is rejected.
    Disabled,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("FOLIO_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("FOLIO_DATA_DIR").ok().filter(|s| !s.is_empty()),
            geoip_path: std::env::var("FOLIO_GEOIP_PATH")
                .unwrap_or_else(|_| "./GeoLite2-City.mmdb".to_string()),
            admin_auth: match std::env::var("FOLIO_ADMIN_PASSWORD") {
                Ok(pw) if !pw.is_empty() => AdminAuth::Password(pw),
                _ => AdminAuth::Disabled,
            },
            token_hours: std::env::var("FOLIO_TOKEN_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            cors_origins: std::env::var("FOLIO_CORS_ORIGINS")
                .map(|v| v.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            buffer_flush_interval_ms: 1000,
            buffer_max_size: 100,
        })
    }

    pub fn buffer_flush_interval(&self) -> Duration {
        Duration::from_millis(self.buffer_flush_interval_ms)
    }
}
