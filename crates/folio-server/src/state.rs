use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{error, info};

use folio_core::{config::Config, visit::Visit};
use folio_duckdb::DuckDbBackend;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// All fields are safe to clone cheaply — heavy resources are wrapped in
/// `Arc` or `Arc<Mutex<_>>`.
pub struct AppState {
    /// The DuckDB backend. Internally uses `Arc<tokio::sync::Mutex<Connection>>`
    /// so it is already cheap to clone and async-safe.
    pub db: Arc<DuckDbBackend>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    /// In-memory visit buffer.
    ///
    /// Lock, drain, release — then flush to DB. The lock is held only long
    /// enough to `std::mem::take` the buffer so the DB write does not block
    /// incoming track requests.
    pub buffer: Arc<Mutex<Vec<Visit>>>,

    /// Per-IP sliding-window rate limiter for POST /api/analytics/track.
    ///
    /// Key: IP address string. Value: deque of request timestamps within the
    /// last 60 seconds. Limit: 60 requests per IP per 60-second window.
    rate_limiter: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
}

impl AppState {
    /// Construct a new `AppState` wrapping the given backend and config.
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
            buffer: Arc::new(Mutex::new(Vec::new())),
            rate_limiter: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check whether `ip` is within the 60 req/min rate limit.
    ///
    /// Returns `true` if the request should proceed, `false` if it should be
    /// rejected with 429. Slides the window on every call.
    pub async fn check_rate_limit(&self, ip: &str) -> bool {
        let mut map = self.rate_limiter.lock().await;
        let window = map.entry(ip.to_string()).or_default();
        let cutoff = Instant::now() - std::time::Duration::from_secs(60);
        // Drop timestamps older than the 60-second window.
        while window.front().is_some_and(|t| *t < cutoff) {
            window.pop_front();
        }
        if window.len() >= 60 {
            return false; // limit reached
        }
        window.push_back(Instant::now());
        true
    }

    /// Append `visits` to the in-memory buffer.
    ///
    /// If the buffer length reaches or exceeds `config.buffer_max_size`
    /// after the append, an immediate flush is triggered instead of waiting
    /// for the interval timer.
    pub async fn push_visits(&self, visits: Vec<Visit>) {
        let should_flush = {
            let mut buf = self.buffer.lock().await;
            buf.extend(visits);
            buf.len() >= self.config.buffer_max_size
        };

        if should_flush {
            self.flush_buffer().await;
        }
    }

    /// Drain the buffer and write all pending visits to DuckDB.
    ///
    /// The `Mutex` is held only for the `std::mem::take` so the track
    /// endpoint is not blocked while the DB write runs.
    pub async fn flush_buffer(&self) {
        let batch: Vec<Visit> = {
            let mut buf = self.buffer.lock().await;
            std::mem::take(&mut *buf)
        };

        if batch.is_empty() {
            return;
        }

        match self.db.insert_visits(&batch).await {
            Ok(()) => {
                info!(count = batch.len(), "Visit buffer flushed to DuckDB");
            }
            Err(e) => {
                error!(count = batch.len(), error = %e, "Buffer flush failed — visits lost");
            }
        }
    }

    /// Background loop: flush the buffer on a fixed interval.
    ///
    /// Spawned as a `tokio::spawn` task in `main.rs`. Runs until the process
    /// exits. Interval is read from `config.buffer_flush_interval_ms`.
    pub async fn run_buffer_flush_loop(self: Arc<Self>) {
        let interval = self.config.buffer_flush_interval();
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            self.flush_buffer().await;
        }
    }
}
