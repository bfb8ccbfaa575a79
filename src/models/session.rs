//! Pomodoro session records.

use serde::{Deserialize, Serialize};

/// One completed timer interval, immutable once recorded.
///
/// `date` is the calendar date the session is attributed to, computed once
/// server-side (UTC) at recording time. Streaks and daily buckets compare
/// these keys, not `completed_at` instants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Server-generated UUID (also used as document ID and as the
    /// idempotency key for stats updates)
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Task the session was spent on, absent for breaks or untracked work
    pub task_id: Option<String>,
    pub kind: SessionKind,
    /// Elapsed duration in seconds, always positive
    pub duration_seconds: u32,
    /// Calendar date key, "YYYY-MM-DD"
    pub date: String,
    /// When the session was recorded (ISO 8601)
    pub completed_at: String,
}

/// Timer interval kind. Only `Work` sessions mutate stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionKind {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    pub fn is_work(self) -> bool {
        self == SessionKind::Work
    }
}
