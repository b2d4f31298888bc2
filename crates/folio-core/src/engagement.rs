use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Most recent session-duration samples retained per user; older samples
/// are pruned on every append.
pub const MAX_SESSION_SAMPLES: i64 = 100;

/// What kind of interaction target a click counter is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickKind {
    Link,
    Navigation,
    Project,
}

impl ClickKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Navigation => "navigation",
            Self::Project => "project",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "link" => Ok(Self::Link),
            "navigation" => Ok(Self::Navigation),
            "project" => Ok(Self::Project),
            _ => Err(anyhow!("kind must be one of: link, navigation, project")),
        }
    }
}

/// The payload the client sends to POST /api/engagement/click.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClickPayload {
    pub user_id: String,
    pub kind: ClickKind,
    pub target_id: String,
    /// Destination URL, recorded for link clicks only.
    pub url: Option<String>,
}

/// The payload the client sends to POST /api/engagement/session at
/// session end.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionPayload {
    pub user_id: String,
    pub session_id: String,
    pub duration_seconds: f64,
}

/// One user's running engagement totals.
#[derive(Debug, Clone, Serialize)]
pub struct UserEngagement {
    pub user_id: String,
    pub first_visit: String,
    pub last_visit: String,
    pub total_sessions: i64,
    pub total_duration_seconds: f64,
}

/// A click counter merged across all users: summed count, most recent
/// `last_clicked` wins.
#[derive(Debug, Clone, Serialize)]
pub struct ClickCount {
    pub target_id: String,
    pub count: i64,
    pub last_clicked: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Session-duration statistics, recomputed from the stored samples on
/// each read.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub sample_count: i64,
    pub total_duration_seconds: f64,
    pub average_duration_seconds: f64,
}

/// The admin engagement report: per-user aggregates plus cross-user
/// merged counters per click kind.
#[derive(Debug, Clone, Serialize)]
pub struct EngagementReport {
    pub users: Vec<UserEngagement>,
    pub link_clicks: Vec<ClickCount>,
    pub navigation_clicks: Vec<ClickCount>,
    pub project_clicks: Vec<ClickCount>,
    pub sessions: SessionStats,
}
