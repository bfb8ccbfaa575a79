// SPDX-License-Identifier: MIT

//! API routes for authenticated users: profile and analytics.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Preferences, User, UserStats};
use crate::services::analytics;
use crate::services::{Achievement, DailyBucket, SubjectBucket, WindowTotals};
use crate::time_utils;
use crate::AppState;

/// Longest allowed analytics/session lookback.
pub const MAX_LOOKBACK_DAYS: u32 = 365;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/analytics", get(get_analytics))
}

// ─── User Profile ────────────────────────────────────────────

/// Public stats fields of the snapshot. The idempotency ledger stays
/// server-side.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_pomodoros: u32,
    pub total_study_time_seconds: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Current user response. Excludes the password hash.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub preferences: Preferences,
    pub stats: StatsSummary,
}

impl UserResponse {
    pub fn from_parts(user: &User, stats: &UserStats) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            preferences: user.preferences.clone(),
            stats: StatsSummary {
                total_pomodoros: stats.total_pomodoros,
                total_study_time_seconds: stats.total_study_time_seconds,
                current_streak: stats.current_streak,
                longest_streak: stats.longest_streak,
            },
        }
    }
}

/// Get current user profile with the stats snapshot.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    let stats = state
        .db
        .get_user_stats(&user.user_id)
        .await?
        .unwrap_or_default();

    Ok(Json(UserResponse::from_parts(&profile, &stats)))
}

// ─── Analytics ───────────────────────────────────────────────

#[derive(Deserialize)]
struct AnalyticsQuery {
    /// Lookback window in days
    #[serde(default = "default_days")]
    days: u32,
}

fn default_days() -> u32 {
    7
}

/// Analytics response: window totals plus chart-ready aggregates.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub totals: WindowTotals,
    pub daily: Vec<DailyBucket>,
    pub subjects: Vec<SubjectBucket>,
    pub achievements: Vec<Achievement>,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Compute analytics over the selected lookback window.
///
/// Aggregates are derived from session history on every query; the
/// persisted snapshot contributes only the streak fields.
async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>> {
    let days = validate_days(params.days)?;

    let start_date = time_utils::window_start(chrono::Utc::now(), days);
    tracing::debug!(
        user_id = %user.user_id,
        days,
        start_date = %start_date,
        "Computing analytics"
    );

    let sessions = state
        .db
        .get_sessions_since(&user.user_id, &start_date)
        .await?;
    let snapshot = state
        .db
        .get_user_stats(&user.user_id)
        .await?
        .unwrap_or_default();

    // Subject resolution: one task query instead of one lookup per session
    let subjects_by_task: HashMap<String, String> = state
        .db
        .get_tasks_for_user(&user.user_id)
        .await?
        .into_iter()
        .map(|task| (task.id, task.subject))
        .collect();

    let totals = analytics::window_totals(&sessions);
    let daily = analytics::aggregate_daily(&sessions);
    let subjects = analytics::aggregate_by_subject(&sessions, &subjects_by_task);
    let achievements = analytics::evaluate_achievements(totals, &daily, &snapshot);

    Ok(Json(AnalyticsResponse {
        totals,
        daily,
        subjects,
        achievements,
        current_streak: snapshot.current_streak,
        longest_streak: snapshot.longest_streak,
    }))
}

/// Shared lookback validation for analytics and session listing.
pub fn validate_days(days: u32) -> Result<u32> {
    if days == 0 || days > MAX_LOOKBACK_DAYS {
        return Err(AppError::BadRequest(format!(
            "'days' must be between 1 and {}",
            MAX_LOOKBACK_DAYS
        )));
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_days_bounds() {
        assert!(validate_days(0).is_err());
        assert!(validate_days(366).is_err());
        assert_eq!(validate_days(1).unwrap(), 1);
        assert_eq!(validate_days(365).unwrap(), 365);
    }
}
