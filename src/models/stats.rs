//! Per-user statistics snapshot and the streak update rule.
//!
//! The snapshot is pre-computed when sessions are recorded, reducing
//! dashboard Firestore reads from O(sessions) to O(1). Session events
//! remain the source of truth: every update is keyed by session ID in an
//! idempotency ledger, so a retried write can never double-apply.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::SessionRecord;

/// Pre-computed statistics snapshot for a user.
///
/// Stored in the `user_stats` collection, keyed by user ID.
/// Updated atomically with session writes via Firestore transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    /// All-time completed work sessions
    #[serde(default)]
    pub total_pomodoros: u32,
    /// Summed duration of all work sessions (seconds)
    #[serde(default)]
    pub total_study_time_seconds: u64,
    /// Consecutive calendar days with at least one work session
    #[serde(default)]
    pub current_streak: u32,
    /// Maximum `current_streak` ever observed
    #[serde(default)]
    pub longest_streak: u32,

    /// Calendar date the streak last advanced. Several work sessions on the
    /// same date advance the streak at most once.
    #[serde(default)]
    pub last_work_date: Option<String>,

    /// Set of processed session IDs (for duplicate detection)
    #[serde(default)]
    pub processed_session_ids: HashSet<String>,

    /// Last update timestamp (ISO 8601)
    #[serde(default)]
    pub updated_at: String,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            total_pomodoros: 0,
            total_study_time_seconds: 0,
            current_streak: 0,
            longest_streak: 0,
            last_work_date: None,
            processed_session_ids: HashSet::new(),
            updated_at: String::new(),
        }
    }
}

impl UserStats {
    /// Apply a recorded session to the snapshot.
    ///
    /// `worked_yesterday` is whether a work session already exists on the
    /// calendar date before `session.date`; the caller resolves it from
    /// session history.
    ///
    /// Returns `true` if the session was applied (new work session).
    /// Returns `false` for breaks and for already-processed IDs (duplicate).
    pub fn update_from_session(
        &mut self,
        session: &SessionRecord,
        worked_yesterday: bool,
        now: &str,
    ) -> bool {
        // Breaks never mutate totals or streak
        if !session.kind.is_work() {
            return false;
        }

        // Idempotency check: skip if already processed
        if self.processed_session_ids.contains(&session.id) {
            return false;
        }

        // Mark as processed
        self.processed_session_ids.insert(session.id.clone());
        self.updated_at = now.to_string();

        self.total_pomodoros += 1;
        self.total_study_time_seconds += u64::from(session.duration_seconds);

        // The streak advances at most once per calendar date
        if self.last_work_date.as_deref() != Some(session.date.as_str()) {
            let new_streak = if worked_yesterday || self.current_streak == 0 {
                self.current_streak + 1
            } else {
                // Chain broken: no work session yesterday
                1
            };

            self.current_streak = new_streak;
            self.longest_streak = self.longest_streak.max(new_streak);
            self.last_work_date = Some(session.date.clone());
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionKind;

    fn make_session(id: &str, kind: SessionKind, date: &str, duration: u32) -> SessionRecord {
        SessionRecord {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            task_id: None,
            kind,
            duration_seconds: duration,
            date: date.to_string(),
            completed_at: format!("{date}T12:00:00Z"),
        }
    }

    fn work(id: &str, date: &str) -> SessionRecord {
        make_session(id, SessionKind::Work, date, 1500)
    }

    #[test]
    fn test_first_session_bootstraps_streak() {
        let mut stats = UserStats::default();

        let applied = stats.update_from_session(&work("s1", "2024-01-15"), false, "now");

        assert!(applied);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);
        assert_eq!(stats.total_pomodoros, 1);
        assert_eq!(stats.total_study_time_seconds, 1500);
    }

    #[test]
    fn test_streak_continues_when_yesterday_had_work() {
        let mut stats = UserStats {
            current_streak: 4,
            longest_streak: 4,
            last_work_date: Some("2024-01-14".to_string()),
            ..UserStats::default()
        };

        stats.update_from_session(&work("s1", "2024-01-15"), true, "now");

        assert_eq!(stats.current_streak, 5);
        assert_eq!(stats.longest_streak, 5);
    }

    #[test]
    fn test_streak_resets_when_chain_broken() {
        let mut stats = UserStats {
            current_streak: 4,
            longest_streak: 9,
            last_work_date: Some("2024-01-10".to_string()),
            ..UserStats::default()
        };

        stats.update_from_session(&work("s1", "2024-01-15"), false, "now");

        assert_eq!(stats.current_streak, 1);
        // Longest streak never decreases
        assert_eq!(stats.longest_streak, 9);
    }

    #[test]
    fn test_same_day_sessions_advance_streak_once() {
        let mut stats = UserStats::default();

        stats.update_from_session(&work("s1", "2024-01-15"), false, "now");
        stats.update_from_session(&work("s2", "2024-01-15"), false, "now");
        stats.update_from_session(&work("s3", "2024-01-15"), false, "now");

        assert_eq!(stats.current_streak, 1);
        // Totals still accumulate per session
        assert_eq!(stats.total_pomodoros, 3);
        assert_eq!(stats.total_study_time_seconds, 4500);
    }

    #[test]
    fn test_breaks_never_mutate_snapshot() {
        let mut stats = UserStats::default();

        let applied =
            stats.update_from_session(&make_session("b1", SessionKind::ShortBreak, "2024-01-15", 300), false, "now");
        stats.update_from_session(&make_session("b2", SessionKind::LongBreak, "2024-01-15", 900), false, "now");

        assert!(!applied);
        assert_eq!(stats.total_pomodoros, 0);
        assert_eq!(stats.total_study_time_seconds, 0);
        assert_eq!(stats.current_streak, 0);
        assert!(stats.processed_session_ids.is_empty());
    }

    #[test]
    fn test_idempotency_skips_duplicate() {
        let mut stats = UserStats::default();
        let session = work("s1", "2024-01-15");

        stats.update_from_session(&session, false, "now");
        let applied_again = stats.update_from_session(&session, false, "now");

        assert!(!applied_again);
        assert_eq!(stats.total_pomodoros, 1); // Not incremented twice
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn test_totals_additive_over_interleaved_kinds() {
        let mut stats = UserStats::default();

        stats.update_from_session(&make_session("w1", SessionKind::Work, "2024-01-14", 1500), false, "now");
        stats.update_from_session(&make_session("b1", SessionKind::ShortBreak, "2024-01-14", 300), false, "now");
        stats.update_from_session(&make_session("w2", SessionKind::Work, "2024-01-15", 1200), true, "now");
        stats.update_from_session(&make_session("b2", SessionKind::LongBreak, "2024-01-15", 900), true, "now");
        stats.update_from_session(&make_session("w3", SessionKind::Work, "2024-01-15", 1500), true, "now");

        assert_eq!(stats.total_pomodoros, 3);
        assert_eq!(stats.total_study_time_seconds, 4200);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
    }

    #[test]
    fn test_longest_streak_invariant_over_sequence() {
        let mut stats = UserStats::default();

        // Three-day run, a gap, then a fresh start
        let steps = [
            ("s1", "2024-01-01", false),
            ("s2", "2024-01-02", true),
            ("s3", "2024-01-03", true),
            ("s4", "2024-01-10", false),
            ("s5", "2024-01-11", true),
        ];

        for (id, date, worked_yesterday) in steps {
            stats.update_from_session(&work(id, date), worked_yesterday, "now");
            assert!(stats.longest_streak >= stats.current_streak);
        }

        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 3);
    }
}
