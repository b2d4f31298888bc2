use anyhow::Result;
use chrono::{DateTime, Utc};

use folio_core::engagement::{
    ClickCount, ClickKind, ClickPayload, EngagementReport, SessionPayload, SessionStats,
    UserEngagement, MAX_SESSION_SAMPLES,
};

use crate::backend::format_ts;
use crate::DuckDbBackend;

impl DuckDbBackend {
    /// Record one click for a (user, kind, target) counter.
    ///
    /// Creates the per-user aggregate row on first contact, then upserts
    /// the counter: count + 1, `last_clicked` stamped, and the destination
    /// URL refreshed when one is supplied.
    pub async fn record_click(&self, payload: &ClickPayload, now: DateTime<Utc>) -> Result<()> {
        let ts = format_ts(&now);
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO engagement_users \
             (user_id, first_visit, last_visit, total_sessions, total_duration) \
             VALUES (?1, ?2, ?3, 0, 0)",
            duckdb::params![payload.user_id, ts, ts],
        )?;
        tx.execute(
            "INSERT INTO click_counters (user_id, kind, target_id, count, last_clicked, url) \
             VALUES (?1, ?2, ?3, 1, ?4, ?5) \
             ON CONFLICT (user_id, kind, target_id) DO UPDATE SET \
                 count = click_counters.count + 1, \
                 last_clicked = excluded.last_clicked, \
                 url = COALESCE(excluded.url, click_counters.url)",
            duckdb::params![
                payload.user_id,
                payload.kind.as_str(),
                payload.target_id,
                ts,
                payload.url,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Record a finished session for a user.
    ///
    /// Bumps the per-user aggregate (session count, cumulative duration,
    /// `last_visit`), appends a duration sample, and prunes samples
    /// beyond the most recent `MAX_SESSION_SAMPLES` for that user.
    pub async fn record_session(&self, payload: &SessionPayload, now: DateTime<Utc>) -> Result<()> {
        let ts = format_ts(&now);
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO engagement_users \
             (user_id, first_visit, last_visit, total_sessions, total_duration) \
             VALUES (?1, ?2, ?3, 1, ?4) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 last_visit = excluded.last_visit, \
                 total_sessions = engagement_users.total_sessions + 1, \
                 total_duration = engagement_users.total_duration + excluded.total_duration",
            duckdb::params![payload.user_id, ts, ts, payload.duration_seconds],
        )?;
        tx.execute(
            "INSERT INTO session_samples (user_id, session_id, duration_seconds, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
            duckdb::params![payload.user_id, payload.session_id, payload.duration_seconds, ts],
        )?;
        // Keep only the most recent samples for this user.
        tx.execute(
            &format!(
                "DELETE FROM session_samples WHERE user_id = ?1 AND rowid NOT IN ( \
                     SELECT rowid FROM session_samples WHERE user_id = ?2 \
                     ORDER BY created_at DESC LIMIT {MAX_SESSION_SAMPLES})"
            ),
            duckdb::params![payload.user_id, payload.user_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// The admin engagement report: per-user aggregates plus cross-user
    /// merged counters and session statistics, all recomputed from the
    /// stored rows on each call.
    pub async fn engagement_report(&self) -> Result<EngagementReport> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(
            "SELECT user_id, strftime(first_visit, '%Y-%m-%d %H:%M:%S'), \
                    strftime(last_visit, '%Y-%m-%d %H:%M:%S'), \
                    total_sessions, total_duration \
             FROM engagement_users ORDER BY last_visit DESC, user_id ASC",
        )?;
        let users = stmt
            .query_map([], |row| {
                Ok(UserEngagement {
                    user_id: row.get(0)?,
                    first_visit: row.get(1)?,
                    last_visit: row.get(2)?,
                    total_sessions: row.get(3)?,
                    total_duration_seconds: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let clicks_for = |kind: ClickKind| -> Result<Vec<ClickCount>> {
            let mut stmt = conn.prepare(
                "SELECT target_id, CAST(SUM(count) AS BIGINT), \
                        strftime(MAX(last_clicked), '%Y-%m-%d %H:%M:%S'), MAX(url) \
                 FROM click_counters WHERE kind = ?1 \
                 GROUP BY target_id ORDER BY SUM(count) DESC, target_id ASC",
            )?;
            let rows = stmt
                .query_map(duckdb::params![kind.as_str()], |row| {
                    Ok(ClickCount {
                        target_id: row.get(0)?,
                        count: row.get(1)?,
                        last_clicked: row.get(2)?,
                        url: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        };

        let link_clicks = clicks_for(ClickKind::Link)?;
        let navigation_clicks = clicks_for(ClickKind::Navigation)?;
        let project_clicks = clicks_for(ClickKind::Project)?;

        let (sample_count, total_duration_seconds, average_duration_seconds): (i64, f64, f64) =
            conn.prepare(
                "SELECT COUNT(*), COALESCE(SUM(duration_seconds), 0), \
                        COALESCE(AVG(duration_seconds), 0) \
                 FROM session_samples",
            )?
            .query_row([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;

        Ok(EngagementReport {
            users,
            link_clicks,
            navigation_clicks,
            project_clicks,
            sessions: SessionStats {
                sample_count,
                total_duration_seconds,
                average_duration_seconds,
            },
        })
    }

    /// Wipe every visit record, click counter, session sample, and
    /// per-user aggregate.
    ///
    /// When `keep_user_id` is supplied, a fresh zeroed aggregate row is
    /// re-created for it so the calling user's identifier survives the
    /// wipe.
    pub async fn clear_all(&self, keep_user_id: Option<&str>, now: DateTime<Utc>) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM visits; \
             DELETE FROM click_counters; \
             DELETE FROM session_samples; \
             DELETE FROM engagement_users;",
        )?;
        if let Some(user_id) = keep_user_id {
            let ts = format_ts(&now);
            tx.execute(
                "INSERT INTO engagement_users \
                 (user_id, first_visit, last_visit, total_sessions, total_duration) \
                 VALUES (?1, ?2, ?3, 0, 0)",
                duckdb::params![user_id, ts, ts],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
