//! Study task model.

use serde::{Deserialize, Serialize};

/// A study task owned by a user.
///
/// `pomodoros_completed` is incremented as a side effect of recording a
/// work session that references this task; everything else changes only
/// through explicit user actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-generated UUID (also used as document ID)
    pub id: String,
    /// Owning user
    pub user_id: String,
    pub title: String,
    pub subject: String,
    #[serde(default)]
    pub priority: TaskPriority,
    /// Due date (ISO 8601)
    pub due_date: String,
    /// Optional calendar placement (ISO 8601)
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub estimated_pomodoros: u32,
    #[serde(default)]
    pub pomodoros_completed: u32,
    /// When the task was created (ISO 8601), used for newest-first listing
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}
