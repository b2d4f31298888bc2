use chrono::Utc;

use folio_core::engagement::{ClickKind, ClickPayload, SessionPayload, MAX_SESSION_SAMPLES};
use folio_duckdb::DuckDbBackend;

fn click(user_id: &str, kind: ClickKind, target_id: &str, url: Option<&str>) -> ClickPayload {
    ClickPayload {
        user_id: user_id.to_string(),
        kind,
        target_id: target_id.to_string(),
        url: url.map(str::to_string),
    }
}

fn session(user_id: &str, session_id: &str, duration_seconds: f64) -> SessionPayload {
    SessionPayload {
        user_id: user_id.to_string(),
        session_id: session_id.to_string(),
        duration_seconds,
    }
}

#[tokio::test]
async fn clicks_increment_per_target_counter() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let now = Utc::now();

    let payload = click("user_a", ClickKind::Link, "github", Some("https://github.com/x"));
    db.record_click(&payload, now).await.expect("click 1");
    db.record_click(&payload, now).await.expect("click 2");
    db.record_click(&click("user_a", ClickKind::Link, "resume", None), now)
        .await
        .expect("click 3");

    let report = db.engagement_report().await.expect("report");
    assert_eq!(report.link_clicks.len(), 2);
    assert_eq!(report.link_clicks[0].target_id, "github");
    assert_eq!(report.link_clicks[0].count, 2);
    assert_eq!(report.link_clicks[0].url.as_deref(), Some("https://github.com/x"));
    assert_eq!(report.link_clicks[1].count, 1);
}

#[tokio::test]
async fn clicks_merge_across_users() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let now = Utc::now();

    db.record_click(&click("user_a", ClickKind::Project, "kremis", None), now)
        .await
        .expect("click");
    db.record_click(&click("user_b", ClickKind::Project, "kremis", None), now)
        .await
        .expect("click");
    db.record_click(&click("user_b", ClickKind::Navigation, "contact", None), now)
        .await
        .expect("click");

    let report = db.engagement_report().await.expect("report");
    assert_eq!(report.project_clicks.len(), 1);
    assert_eq!(report.project_clicks[0].count, 2, "summed across users");
    assert_eq!(report.navigation_clicks.len(), 1);
    assert_eq!(report.navigation_clicks[0].target_id, "contact");
    // Both users got aggregate rows on first contact.
    assert_eq!(report.users.len(), 2);
}

#[tokio::test]
async fn kinds_are_kept_apart() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let now = Utc::now();

    db.record_click(&click("user_a", ClickKind::Link, "about", None), now)
        .await
        .expect("click");
    db.record_click(&click("user_a", ClickKind::Navigation, "about", None), now)
        .await
        .expect("click");

    let report = db.engagement_report().await.expect("report");
    assert_eq!(report.link_clicks.len(), 1);
    assert_eq!(report.navigation_clicks.len(), 1);
    assert_eq!(report.link_clicks[0].count, 1);
    assert_eq!(report.navigation_clicks[0].count, 1);
}

#[tokio::test]
async fn sessions_update_user_aggregate_and_average() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let now = Utc::now();

    db.record_session(&session("user_a", "s1", 30.0), now)
        .await
        .expect("session 1");
    db.record_session(&session("user_a", "s2", 90.0), now)
        .await
        .expect("session 2");

    let report = db.engagement_report().await.expect("report");
    assert_eq!(report.users.len(), 1);
    let user = &report.users[0];
    assert_eq!(user.user_id, "user_a");
    assert_eq!(user.total_sessions, 2);
    assert!((user.total_duration_seconds - 120.0).abs() < f64::EPSILON);

    assert_eq!(report.sessions.sample_count, 2);
    assert!((report.sessions.average_duration_seconds - 60.0).abs() < f64::EPSILON);
    assert!((report.sessions.total_duration_seconds - 120.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn session_samples_are_capped_per_user() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let now = Utc::now();

    for i in 0..(MAX_SESSION_SAMPLES + 10) {
        db.record_session(&session("user_a", &format!("s{i}"), 10.0), now)
            .await
            .expect("session");
    }
    // A second user's samples are not affected by the first user's cap.
    db.record_session(&session("user_b", "other", 5.0), now)
        .await
        .expect("session");

    let report = db.engagement_report().await.expect("report");
    assert_eq!(report.sessions.sample_count, MAX_SESSION_SAMPLES + 1);

    let user_a = report
        .users
        .iter()
        .find(|u| u.user_id == "user_a")
        .expect("user_a aggregate");
    // The aggregate keeps counting past the sample cap.
    assert_eq!(user_a.total_sessions, MAX_SESSION_SAMPLES + 10);
}

#[tokio::test]
async fn clear_resets_counters_but_preserves_caller_identifier() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let now = Utc::now();

    db.record_click(&click("user_a", ClickKind::Link, "github", None), now)
        .await
        .expect("click");
    db.record_session(&session("user_a", "s1", 45.0), now)
        .await
        .expect("session");

    db.clear_all(Some("user_a"), now).await.expect("clear");

    let report = db.engagement_report().await.expect("report");
    assert!(report.link_clicks.is_empty());
    assert!(report.navigation_clicks.is_empty());
    assert!(report.project_clicks.is_empty());
    assert_eq!(report.sessions.sample_count, 0);
    assert_eq!(report.sessions.average_duration_seconds, 0.0);

    // The calling user survives with zeroed counters.
    assert_eq!(report.users.len(), 1);
    let user = &report.users[0];
    assert_eq!(user.user_id, "user_a");
    assert_eq!(user.total_sessions, 0);
    assert_eq!(user.total_duration_seconds, 0.0);
}
