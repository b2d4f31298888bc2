use chrono::Utc;
use serde::Serialize;

/// Number of days of history a summary covers.
pub const SUMMARY_WINDOW_DAYS: i64 = 30;

/// Number of buckets in the daily histogram. The histogram always has
/// exactly this many entries, zero-filled where no visits occurred.
pub const HISTOGRAM_DAYS: i64 = 14;

/// How many rows of each top-N grouping the summary reports.
pub const TOP_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct CountryCount {
    pub country: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferrerCount {
    pub source: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageCount {
    pub path: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayCount {
    /// Calendar day in `YYYY-MM-DD` (UTC).
    pub date: String,
    pub count: i64,
}

/// Aggregate view over the trailing 30-day window.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub total_views: i64,
    pub unique_visitors: i64,
    pub top_countries: Vec<CountryCount>,
    pub top_referrers: Vec<ReferrerCount>,
    pub views_by_day: Vec<DayCount>,
    pub top_pages: Vec<PageCount>,
}

impl AnalyticsSummary {
    /// The all-zero summary, used both for an empty store and as the fixed
    /// fallback payload when summary computation fails. Carries the full
    /// 14-entry zero-filled histogram ending today (UTC).
    pub fn empty() -> Self {
        let today = Utc::now().date_naive();
        let views_by_day = (0..HISTOGRAM_DAYS)
            .rev()
            .map(|offset| DayCount {
                date: (today - chrono::Duration::days(offset)).to_string(),
                count: 0,
            })
            .collect();
        Self {
            total_views: 0,
            unique_visitors: 0,
            top_countries: Vec::new(),
            top_referrers: Vec::new(),
            views_by_day,
            top_pages: Vec::new(),
        }
    }
}
