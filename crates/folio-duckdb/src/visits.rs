use anyhow::Result;
use chrono::DateTime;

use folio_core::visit::Visit;

use crate::backend::format_ts;
use crate::DuckDbBackend;

impl DuckDbBackend {
    /// Insert a batch of enriched visits in a single transaction.
    ///
    /// Called by the buffer-flush background task. Each `Visit` must
    /// already have its referrer source, UA fields, and geo fields
    /// populated by the enrichment layer in `folio-server`.
    ///
    /// Returns immediately (no-op) if `visits` is empty.
    pub async fn insert_visits(&self, visits: &[Visit]) -> Result<()> {
        if visits.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock().await;

        // Wrap the entire batch in a single transaction for atomicity and
        // throughput (one fsync instead of N).
        let tx = conn.transaction()?;
        for visit in visits {
            tx.execute(
                r#"INSERT INTO visits (
                    id, visitor_id, session_id, path, referrer,
                    browser, device, location, country, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
                duckdb::params![
                    visit.id,
                    visit.visitor_id,
                    visit.session_id,
                    visit.path,
                    visit.referrer,
                    visit.browser,
                    visit.device,
                    visit.location,
                    visit.country,
                    format_ts(&visit.created_at),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// The `limit` newest visits, newest first.
    pub async fn recent_visits(&self, limit: i64) -> Result<Vec<Visit>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            r#"SELECT id, visitor_id, session_id, path, referrer,
                      browser, device, location, country, epoch_us(created_at)
               FROM visits
               ORDER BY created_at DESC
               LIMIT ?1"#,
        )?;
        let rows = stmt.query_map(duckdb::params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, Option<String>>(8)?,
                row.get::<_, i64>(9)?,
            ))
        })?;

        let mut visits = Vec::new();
        for row in rows {
            let (id, visitor_id, session_id, path, referrer, browser, device, location, country, us) =
                row?;
            visits.push(Visit {
                id,
                visitor_id,
                session_id,
                path,
                referrer,
                browser,
                device,
                location,
                country,
                created_at: DateTime::from_timestamp_micros(us).unwrap_or_default(),
            });
        }
        Ok(visits)
    }

    /// Total number of stored visits, regardless of window. Used by tests
    /// and the clear path.
    pub async fn count_visits(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM visits")?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(count)
    }
}
