// SPDX-License-Identifier: MIT

//! Study task CRUD routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Task, TaskPriority};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
}

/// List the caller's tasks, newest-created first.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Task>>> {
    let tasks = state.db.get_tasks_for_user(&user.user_id).await?;
    tracing::debug!(user_id = %user.user_id, count = tasks.len(), "Listed tasks");
    Ok(Json(tasks))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub subject: String,
    /// Due date (ISO 8601), required
    #[validate(length(min = 1, message = "must not be empty"))]
    pub due_date: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default = "default_estimated")]
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub estimated_pomodoros: u32,
    pub scheduled_date: Option<String>,
}

fn default_estimated() -> u32 {
    1
}

/// Create a task.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let task = Task {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.user_id.clone(),
        title: payload.title,
        subject: payload.subject,
        priority: payload.priority,
        due_date: payload.due_date,
        scheduled_date: payload.scheduled_date,
        completed: false,
        estimated_pomodoros: payload.estimated_pomodoros,
        pomodoros_completed: 0,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    state.db.upsert_task(&task).await?;

    tracing::info!(user_id = %user.user_id, task_id = %task.id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Partial task update. Absent fields are left unchanged; `scheduledDate`
/// additionally accepts an explicit null to clear the calendar placement.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub scheduled_date: Option<Option<String>>,
    pub completed: Option<bool>,
    pub estimated_pomodoros: Option<u32>,
}

/// Wraps a present value (including null) in `Some`, so a missing field
/// stays distinguishable from an explicit null.
fn double_option<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Update a task's user-editable fields.
async fn update_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<String>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<Task>> {
    let mut task = load_owned_task(&state, &user, &task_id).await?;

    if let Some(title) = payload.title {
        if title.is_empty() {
            return Err(AppError::BadRequest("title: must not be empty".to_string()));
        }
        task.title = title;
    }
    if let Some(subject) = payload.subject {
        if subject.is_empty() {
            return Err(AppError::BadRequest(
                "subject: must not be empty".to_string(),
            ));
        }
        task.subject = subject;
    }
    if let Some(priority) = payload.priority {
        task.priority = priority;
    }
    if let Some(due_date) = payload.due_date {
        task.due_date = due_date;
    }
    if let Some(scheduled_date) = payload.scheduled_date {
        task.scheduled_date = scheduled_date;
    }
    if let Some(completed) = payload.completed {
        task.completed = completed;
    }
    if let Some(estimated) = payload.estimated_pomodoros {
        task.estimated_pomodoros = estimated.max(1);
    }

    state.db.upsert_task(&task).await?;

    Ok(Json(task))
}

/// Delete a task.
///
/// Sessions recorded against the task are kept; they drop out of subject
/// analytics once the task is gone.
async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<String>,
) -> Result<StatusCode> {
    let task = load_owned_task(&state, &user, &task_id).await?;

    state.db.delete_task(&task.id).await?;

    tracing::info!(user_id = %user.user_id, task_id = %task.id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Fetch a task, returning NotFound both for missing tasks and for tasks
/// owned by another user.
async fn load_owned_task(
    state: &Arc<AppState>,
    user: &AuthUser,
    task_id: &str,
) -> Result<Task> {
    match state.db.get_task(task_id).await? {
        Some(task) if task.user_id == user.user_id => Ok(task),
        _ => Err(AppError::NotFound(format!("Task {} not found", task_id))),
    }
}
