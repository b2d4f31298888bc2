/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup (idempotent).
///
/// The memory limit is fixed at 512MB — the DuckDB default (80% of system
/// RAM) is not acceptable for a server process, and a portfolio-sized
/// dataset never approaches the limit. `SET threads = 2` bounds the
/// background thread pool for single-writer embedded use.
pub fn init_sql() -> &'static str {
    r#"SET memory_limit = '512MB';
SET threads = 2;

-- ===========================================
-- SETTINGS
-- ===========================================
-- Keys stored in this table:
--   'jwt_secret'  – 32-byte random hex signing key for admin bearer tokens
--                   (created lazily the first time auth needs it)
--   'version'     – Database schema version
--   'install_id'  – Unique installation identifier
CREATE TABLE IF NOT EXISTS settings (
    key             VARCHAR PRIMARY KEY,
    value           VARCHAR NOT NULL
);

-- ===========================================
-- VISITS (one row per logged page view)
-- ===========================================
CREATE TABLE IF NOT EXISTS visits (
    id              VARCHAR NOT NULL,              -- UUID v4, unique per row
    visitor_id      VARCHAR NOT NULL,              -- sha256(salt_epoch + ip + ua)[0:16]
    session_id      VARCHAR NOT NULL,
    path            VARCHAR NOT NULL,
    referrer        VARCHAR NOT NULL,              -- classified source ('Direct', 'Google', domain, ...)
    browser         VARCHAR,
    device          VARCHAR,                       -- 'desktop' | 'mobile' | 'tablet'
    location        VARCHAR,                       -- 'City, CC' or country
    country         VARCHAR,                       -- ISO 3166-1 alpha-2 ('Local' for loopback)
    created_at      TIMESTAMP NOT NULL
);
-- Optimised for the recent-visitors list and the trailing-window summary
CREATE INDEX IF NOT EXISTS idx_visits_created ON visits(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_visits_visitor ON visits(visitor_id);

-- ===========================================
-- ENGAGEMENT (per-user aggregates + counters)
-- ===========================================
CREATE TABLE IF NOT EXISTS engagement_users (
    user_id         VARCHAR PRIMARY KEY,           -- client-generated identifier
    first_visit     TIMESTAMP NOT NULL,
    last_visit      TIMESTAMP NOT NULL,
    total_sessions  BIGINT NOT NULL DEFAULT 0,
    total_duration  DOUBLE NOT NULL DEFAULT 0      -- cumulative seconds across sessions
);

CREATE TABLE IF NOT EXISTS click_counters (
    user_id         VARCHAR NOT NULL,
    kind            VARCHAR NOT NULL,              -- 'link' | 'navigation' | 'project'
    target_id       VARCHAR NOT NULL,
    count           BIGINT NOT NULL DEFAULT 0,
    last_clicked    TIMESTAMP NOT NULL,
    url             VARCHAR,                       -- destination, recorded for links only
    PRIMARY KEY (user_id, kind, target_id)
);

-- Capped to the most recent 100 rows per user; pruned on every append.
CREATE TABLE IF NOT EXISTS session_samples (
    user_id         VARCHAR NOT NULL,
    session_id      VARCHAR NOT NULL,
    duration_seconds DOUBLE NOT NULL,
    created_at      TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_samples_user_created
    ON session_samples(user_id, created_at DESC);
"#
}
