// SPDX-License-Identifier: MIT

//! Pomodoro session recording and listing.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
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
use crate::models::{SessionKind, SessionRecord};
use crate::routes::api::validate_days;
use crate::time_utils;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/sessions", get(list_sessions).post(record_session))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSessionRequest {
    pub task_id: Option<String>,
    pub kind: SessionKind,
    pub duration_seconds: u32,
}

/// Record a completed timer interval for the authenticated user.
///
/// The calendar date is resolved here, once, in UTC. Work sessions go
/// through the atomic snapshot/task update; breaks are a plain append.
async fn record_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RecordSessionRequest>,
) -> Result<impl IntoResponse> {
    if payload.duration_seconds == 0 {
        return Err(AppError::BadRequest(
            "duration_seconds must be positive".to_string(),
        ));
    }

    // A task reference must resolve to one of the caller's tasks
    if let Some(task_id) = &payload.task_id {
        match state.db.get_task(task_id).await? {
            Some(task) if task.user_id == user.user_id => {}
            _ => {
                return Err(AppError::BadRequest(format!(
                    "Unknown task reference: {}",
                    task_id
                )))
            }
        }
    }

    let now = chrono::Utc::now();
    let session = SessionRecord {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.user_id.clone(),
        task_id: payload.task_id,
        kind: payload.kind,
        duration_seconds: payload.duration_seconds,
        date: time_utils::calendar_date(now),
        completed_at: time_utils::format_utc_rfc3339(now),
    };

    if session.kind.is_work() {
        state.db.record_work_session_atomic(&session).await?;
    } else {
        state.db.create_session(&session).await?;
    }

    tracing::info!(
        user_id = %user.user_id,
        session_id = %session.id,
        kind = ?session.kind,
        "Session recorded"
    );

    Ok((StatusCode::CREATED, Json(session)))
}

#[derive(Deserialize)]
struct SessionsQuery {
    /// Lookback window in days
    #[serde(default = "default_days")]
    days: u32,
}

fn default_days() -> u32 {
    7
}

/// Session list entry with the referenced task resolved.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub task_id: Option<String>,
    pub kind: SessionKind,
    pub duration_seconds: u32,
    pub date: String,
    pub completed_at: String,
    pub task_title: Option<String>,
    pub task_subject: Option<String>,
}

/// List the caller's sessions within a lookback window (default 7 days),
/// each resolved with its task's title and subject when still available.
async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<SessionsQuery>,
) -> Result<Json<Vec<SessionResponse>>> {
    let days = validate_days(params.days)?;

    let start_date = time_utils::window_start(chrono::Utc::now(), days);
    let sessions = state
        .db
        .get_sessions_since(&user.user_id, &start_date)
        .await?;

    // One query resolves every task reference
    let tasks: HashMap<String, (String, String)> = state
        .db
        .get_tasks_for_user(&user.user_id)
        .await?
        .into_iter()
        .map(|task| (task.id, (task.title, task.subject)))
        .collect();

    let resolved = sessions
        .into_iter()
        .map(|session| {
            let task = session.task_id.as_ref().and_then(|id| tasks.get(id));
            SessionResponse {
                id: session.id,
                task_id: session.task_id.clone(),
                kind: session.kind,
                duration_seconds: session.duration_seconds,
                date: session.date,
                completed_at: session.completed_at,
                task_title: task.map(|(title, _)| title.clone()),
                task_subject: task.map(|(_, subject)| subject.clone()),
            }
        })
        .collect();

    Ok(Json(resolved))
}
