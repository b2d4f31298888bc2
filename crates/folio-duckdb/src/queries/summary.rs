use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};

use folio_core::summary::{
    AnalyticsSummary, CountryCount, DayCount, PageCount, ReferrerCount, HISTOGRAM_DAYS,
    SUMMARY_WINDOW_DAYS, TOP_LIMIT,
};

use crate::backend::format_ts;
use crate::DuckDbBackend;

pub async fn analytics_summary_inner(
    db: &DuckDbBackend,
    now: DateTime<Utc>,
) -> Result<AnalyticsSummary> {
    let window_start = format_ts(&(now - chrono::Duration::days(SUMMARY_WINDOW_DAYS)));
    let conn = db.conn.lock().await;

    // Totals: every record in the trailing window, and the distinct
    // visitor identifiers among them.
    let (total_views, unique_visitors): (i64, i64) = conn
        .prepare(
            "SELECT COUNT(*), COUNT(DISTINCT visitor_id) FROM visits WHERE created_at > ?1",
        )?
        .query_row(duckdb::params![window_start], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;

    // Top countries by frequency. Records without a country are skipped.
    let mut stmt = conn.prepare(&format!(
        "SELECT country, COUNT(*) FROM visits \
         WHERE created_at > ?1 AND country IS NOT NULL AND country != '' \
         GROUP BY country ORDER BY COUNT(*) DESC, country ASC LIMIT {TOP_LIMIT}"
    ))?;
    let top_countries = stmt
        .query_map(duckdb::params![window_start], |row| {
            Ok(CountryCount {
                country: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    // Top referrer sources. The stored value is already classified at
    // ingest; an empty value still counts as Direct.
    let mut stmt = conn.prepare(&format!(
        "SELECT CASE WHEN referrer = '' THEN 'Direct' ELSE referrer END AS source, COUNT(*) \
         FROM visits WHERE created_at > ?1 \
         GROUP BY source ORDER BY COUNT(*) DESC, source ASC LIMIT {TOP_LIMIT}"
    ))?;
    let top_referrers = stmt
        .query_map(duckdb::params![window_start], |row| {
            Ok(ReferrerCount {
                source: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    // Top pages by frequency.
    let mut stmt = conn.prepare(&format!(
        "SELECT path, COUNT(*) FROM visits WHERE created_at > ?1 \
         GROUP BY path ORDER BY COUNT(*) DESC, path ASC LIMIT {TOP_LIMIT}"
    ))?;
    let top_pages = stmt
        .query_map(duckdb::params![window_start], |row| {
            Ok(PageCount {
                path: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    // Daily counts over the window, then zero-fill the trailing 14 days
    // so the histogram always has exactly HISTOGRAM_DAYS entries.
    let mut stmt = conn.prepare(
        "SELECT strftime(created_at, '%Y-%m-%d'), COUNT(*) FROM visits \
         WHERE created_at > ?1 GROUP BY 1",
    )?;
    let day_counts: HashMap<String, i64> = stmt
        .query_map(duckdb::params![window_start], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<HashMap<_, _>, _>>()?;

    let today = now.date_naive();
    let views_by_day = (0..HISTOGRAM_DAYS)
        .rev()
        .map(|offset| {
            let date = (today - chrono::Duration::days(offset)).to_string();
            let count = day_counts.get(&date).copied().unwrap_or(0);
            DayCount { date, count }
        })
        .collect();

    Ok(AnalyticsSummary {
        total_views,
        unique_visitors,
        top_countries,
        top_referrers,
        views_by_day,
        top_pages,
    })
}

impl DuckDbBackend {
    /// Compute the aggregate summary over the trailing 30-day window,
    /// ending now.
    pub async fn analytics_summary(&self) -> Result<AnalyticsSummary> {
        analytics_summary_inner(self, Utc::now()).await
    }
}
