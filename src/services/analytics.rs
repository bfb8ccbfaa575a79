// SPDX-License-Identifier: MIT

//! Aggregation of session history into chart-ready buckets.
//!
//! All functions here are pure, single-pass transformations over a slice of
//! session records. Achievements are recomputed from scratch on every query
//! rather than persisted, so they reflect the currently selected time
//! window, not all-time history.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{SessionRecord, UserStats};

/// Seconds of study time worth ten full 25-minute sessions.
const TIME_MASTER_THRESHOLD_SECONDS: u64 = 25 * 60 * 10;

/// Per-date aggregate for the daily progress chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct DailyBucket {
    /// Calendar date key, "YYYY-MM-DD"
    pub date: String,
    pub pomodoro_count: u32,
    pub study_time_seconds: u64,
}

/// Per-subject aggregate for the subject breakdown chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SubjectBucket {
    pub subject: String,
    pub count: u32,
    pub total_time_seconds: u64,
}

/// Window-wide work session totals.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WindowTotals {
    pub total_pomodoros: u32,
    pub total_study_time_seconds: u64,
}

/// One entry of the fixed achievement catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Achievement {
    pub name: &'static str,
    pub earned: bool,
}

/// Sum work session counts and durations over a window.
pub fn window_totals(sessions: &[SessionRecord]) -> WindowTotals {
    sessions
        .iter()
        .filter(|s| s.kind.is_work())
        .fold(WindowTotals::default(), |mut totals, s| {
            totals.total_pomodoros += 1;
            totals.total_study_time_seconds += u64::from(s.duration_seconds);
            totals
        })
}

/// Group work sessions by calendar date, ordered by date ascending.
///
/// Dates with only break sessions produce no bucket.
pub fn aggregate_daily(sessions: &[SessionRecord]) -> Vec<DailyBucket> {
    let mut by_date: BTreeMap<&str, (u32, u64)> = BTreeMap::new();

    for session in sessions.iter().filter(|s| s.kind.is_work()) {
        let bucket = by_date.entry(session.date.as_str()).or_insert((0, 0));
        bucket.0 += 1;
        bucket.1 += u64::from(session.duration_seconds);
    }

    by_date
        .into_iter()
        .map(|(date, (pomodoro_count, study_time_seconds))| DailyBucket {
            date: date.to_string(),
            pomodoro_count,
            study_time_seconds,
        })
        .collect()
}

/// Group work sessions by the subject of their referenced task.
///
/// `subjects_by_task` maps task ID to subject. Sessions without a task, or
/// whose task is not in the map, are excluded entirely rather than bucketed
/// under an "unknown" label. Sorted by count descending, then subject name.
pub fn aggregate_by_subject(
    sessions: &[SessionRecord],
    subjects_by_task: &HashMap<String, String>,
) -> Vec<SubjectBucket> {
    let mut by_subject: HashMap<&str, (u32, u64)> = HashMap::new();

    for session in sessions.iter().filter(|s| s.kind.is_work()) {
        let Some(subject) = session
            .task_id
            .as_ref()
            .and_then(|task_id| subjects_by_task.get(task_id))
        else {
            continue;
        };

        let bucket = by_subject.entry(subject.as_str()).or_insert((0, 0));
        bucket.0 += 1;
        bucket.1 += u64::from(session.duration_seconds);
    }

    let mut buckets: Vec<SubjectBucket> = by_subject
        .into_iter()
        .map(|(subject, (count, total_time_seconds))| SubjectBucket {
            subject: subject.to_string(),
            count,
            total_time_seconds,
        })
        .collect();

    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.subject.cmp(&b.subject)));
    buckets
}

/// Evaluate the fixed achievement catalog over already-computed aggregates.
///
/// Totals and daily buckets come from the selected window; streak fields
/// come from the persisted snapshot.
pub fn evaluate_achievements(
    totals: WindowTotals,
    daily: &[DailyBucket],
    snapshot: &UserStats,
) -> Vec<Achievement> {
    let best_day = daily.iter().map(|b| b.pomodoro_count).max().unwrap_or(0);

    vec![
        Achievement {
            name: "First Pomodoro",
            earned: totals.total_pomodoros >= 1,
        },
        Achievement {
            name: "Study Streak",
            earned: snapshot.current_streak >= 3,
        },
        Achievement {
            name: "Productive Day",
            earned: best_day >= 8,
        },
        Achievement {
            name: "Time Master",
            earned: totals.total_study_time_seconds >= TIME_MASTER_THRESHOLD_SECONDS,
        },
        Achievement {
            name: "Consistency King",
            earned: snapshot.longest_streak >= 7,
        },
    ]
}
