use chrono::{Duration, Utc};
use uuid::Uuid;

use folio_core::summary::HISTOGRAM_DAYS;
use folio_core::visit::Visit;
use folio_duckdb::DuckDbBackend;

/// Build a visit `days_ago` days in the past with the given dimensions.
fn make_visit(visitor_id: &str, path: &str, referrer: &str, country: Option<&str>, days_ago: i64) -> Visit {
    Visit {
        id: Uuid::new_v4().to_string(),
        visitor_id: visitor_id.to_string(),
        session_id: Uuid::new_v4().to_string(),
        path: path.to_string(),
        referrer: referrer.to_string(),
        browser: Some("Chrome".to_string()),
        device: Some("desktop".to_string()),
        location: country.map(|c| format!("Somewhere, {c}")),
        country: country.map(str::to_string),
        created_at: Utc::now() - Duration::days(days_ago),
    }
}

#[tokio::test]
async fn total_views_counts_only_the_trailing_window() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    db.insert_visits(&[
        make_visit("v1", "/", "Direct", Some("DE"), 0),
        make_visit("v1", "/projects", "Google", Some("DE"), 5),
        make_visit("v2", "/", "Direct", Some("US"), 40),
    ])
    .await
    .expect("insert");

    let summary = db.analytics_summary().await.expect("summary");
    assert_eq!(summary.total_views, 2, "the 40-day-old visit is outside the window");
    assert_eq!(summary.unique_visitors, 1);
}

#[tokio::test]
async fn unique_visitors_counts_distinct_identifiers() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    db.insert_visits(&[
        make_visit("v1", "/", "Direct", None, 0),
        make_visit("v1", "/about", "Direct", None, 1),
        make_visit("v2", "/", "Direct", None, 2),
        make_visit("v3", "/", "Direct", None, 3),
    ])
    .await
    .expect("insert");

    let summary = db.analytics_summary().await.expect("summary");
    assert_eq!(summary.total_views, 4);
    assert_eq!(summary.unique_visitors, 3);
}

#[tokio::test]
async fn histogram_always_has_fourteen_zero_filled_entries() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");

    // Empty store: all zeros, still 14 entries.
    let summary = db.analytics_summary().await.expect("summary");
    assert_eq!(summary.views_by_day.len(), HISTOGRAM_DAYS as usize);
    assert!(summary.views_by_day.iter().all(|d| d.count == 0));

    // Two visits today, one three days ago.
    db.insert_visits(&[
        make_visit("v1", "/", "Direct", None, 0),
        make_visit("v2", "/", "Direct", None, 0),
        make_visit("v1", "/gallery", "Direct", None, 3),
    ])
    .await
    .expect("insert");

    let summary = db.analytics_summary().await.expect("summary");
    assert_eq!(summary.views_by_day.len(), HISTOGRAM_DAYS as usize);
    let last = summary.views_by_day.last().expect("today bucket");
    assert_eq!(last.date, Utc::now().date_naive().to_string());
    assert_eq!(last.count, 2);

    let three_days_ago = (Utc::now().date_naive() - Duration::days(3)).to_string();
    let bucket = summary
        .views_by_day
        .iter()
        .find(|d| d.date == three_days_ago)
        .expect("three-days-ago bucket");
    assert_eq!(bucket.count, 1);

    let filled: i64 = summary.views_by_day.iter().map(|d| d.count).sum();
    assert_eq!(filled, 3, "remaining buckets are zero-filled");
}

#[tokio::test]
async fn top_countries_skip_missing_and_rank_by_frequency() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    db.insert_visits(&[
        make_visit("v1", "/", "Direct", Some("DE"), 0),
        make_visit("v2", "/", "Direct", Some("DE"), 0),
        make_visit("v3", "/", "Direct", Some("US"), 0),
        make_visit("v4", "/", "Direct", None, 0),
    ])
    .await
    .expect("insert");

    let summary = db.analytics_summary().await.expect("summary");
    assert_eq!(summary.top_countries.len(), 2);
    assert_eq!(summary.top_countries[0].country, "DE");
    assert_eq!(summary.top_countries[0].count, 2);
    assert_eq!(summary.top_countries[1].country, "US");
}

#[tokio::test]
async fn top_referrers_cap_at_five() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let sources = ["Google", "GitHub", "Twitter", "Reddit", "LinkedIn", "Bing", "Direct"];
    let mut visits = Vec::new();
    for (i, source) in sources.iter().enumerate() {
        // Give earlier sources more hits so the ranking is deterministic.
        for _ in 0..(sources.len() - i) {
            visits.push(make_visit("v1", "/", source, None, 0));
        }
    }
    db.insert_visits(&visits).await.expect("insert");

    let summary = db.analytics_summary().await.expect("summary");
    assert_eq!(summary.top_referrers.len(), 5);
    assert_eq!(summary.top_referrers[0].source, "Google");
    assert_eq!(summary.top_referrers[0].count, 7);
    assert!(summary.top_referrers.iter().all(|r| r.source != "Direct"));
}

#[tokio::test]
async fn empty_referrer_counts_as_direct() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    db.insert_visits(&[
        make_visit("v1", "/", "", None, 0),
        make_visit("v2", "/", "Direct", None, 0),
    ])
    .await
    .expect("insert");

    let summary = db.analytics_summary().await.expect("summary");
    assert_eq!(summary.top_referrers.len(), 1);
    assert_eq!(summary.top_referrers[0].source, "Direct");
    assert_eq!(summary.top_referrers[0].count, 2);
}

#[tokio::test]
async fn top_pages_rank_by_frequency() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    db.insert_visits(&[
        make_visit("v1", "/projects", "Direct", None, 0),
        make_visit("v2", "/projects", "Direct", None, 0),
        make_visit("v3", "/", "Direct", None, 0),
    ])
    .await
    .expect("insert");

    let summary = db.analytics_summary().await.expect("summary");
    assert_eq!(summary.top_pages[0].path, "/projects");
    assert_eq!(summary.top_pages[0].count, 2);
}

#[tokio::test]
async fn recent_visits_newest_first_and_limited() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let visits: Vec<Visit> = (0..10)
        .map(|i| make_visit("v1", &format!("/page{i}"), "Direct", None, i))
        .collect();
    db.insert_visits(&visits).await.expect("insert");

    let recent = db.recent_visits(3).await.expect("recent");
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].path, "/page0", "newest first");
    assert_eq!(recent[1].path, "/page1");
    assert!(recent[0].created_at >= recent[1].created_at);
}

#[tokio::test]
async fn clear_wipes_visits() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    db.insert_visits(&[make_visit("v1", "/", "Direct", Some("DE"), 0)])
        .await
        .expect("insert");
    assert_eq!(db.count_visits().await.expect("count"), 1);

    db.clear_all(None, Utc::now()).await.expect("clear");

    assert_eq!(db.count_visits().await.expect("count"), 0);
    let summary = db.analytics_summary().await.expect("summary");
    assert_eq!(summary.total_views, 0);
    assert_eq!(summary.views_by_day.len(), HISTOGRAM_DAYS as usize);
}
