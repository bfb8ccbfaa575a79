// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, email lookup)
//! - Tasks (study task CRUD)
//! - Sessions (append-only Pomodoro session log)
//! - User stats (pre-computed snapshot, updated transactionally)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{SessionRecord, Task, User, UserStats};
use crate::time_utils;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing
        // a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by document ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up a user by email (unique per account).
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("email").eq(email.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Task Operations ─────────────────────────────────────────

    /// Get a task by document ID.
    pub async fn get_task(&self, task_id: &str) -> Result<Option<Task>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TASKS)
            .obj()
            .one(task_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all tasks for a user, newest-created first.
    pub async fn get_tasks_for_user(&self, user_id: &str) -> Result<Vec<Task>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TASKS)
            .filter(move |q| q.field("userId").eq(user_id.clone()))
            .order_by([(
                "createdAt",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a task.
    pub async fn upsert_task(&self, task: &Task) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TASKS)
            .document_id(&task.id)
            .object(task)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a task.
    ///
    /// Historical sessions referencing the task are kept; analytics simply
    /// stops resolving their subject.
    pub async fn delete_task(&self, task_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::TASKS)
            .document_id(task_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Session Operations ──────────────────────────────────────

    /// Get all sessions for a user with `date >= start_date`, newest first.
    pub async fn get_sessions_since(
        &self,
        user_id: &str,
        start_date: &str,
    ) -> Result<Vec<SessionRecord>, AppError> {
        let user_id = user_id.to_string();
        let start_date = start_date.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SESSIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("userId").eq(user_id.clone()),
                    q.field("date").greater_than_or_equal(start_date.clone()),
                ])
            })
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether any work session exists for a user on a calendar date.
    pub async fn has_work_session_on(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<bool, AppError> {
        let user_id = user_id.to_string();
        let date = date.to_string();
        let sessions: Vec<SessionRecord> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::SESSIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("userId").eq(user_id.clone()),
                    q.field("date").eq(date.clone()),
                    q.field("kind").eq("work"),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(!sessions.is_empty())
    }

    /// Append a break session (no stats involvement).
    pub async fn create_session(&self, session: &SessionRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SESSIONS)
            .document_id(&session.id)
            .object(session)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── User Stats Operations ──────────────────────────────────

    /// Get the stats snapshot for a user.
    pub async fn get_user_stats(&self, user_id: &str) -> Result<Option<UserStats>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_STATS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store the stats snapshot for a user.
    pub async fn set_user_stats(
        &self,
        user_id: &str,
        stats: &UserStats,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_STATS)
            .document_id(user_id)
            .object(stats)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Atomic Work Session Recording ──────────────────────────

    /// Atomically record a work session: store the session record, update
    /// the stats snapshot (streak rule), and bump the referenced task's
    /// completed-pomodoro count.
    ///
    /// All writes go through a single Firestore transaction so they succeed
    /// or fail together. If another request modifies the stats concurrently,
    /// Firestore retries with fresh data, preventing lost streak updates.
    ///
    /// Returns `true` if the session was newly recorded, `false` if its ID
    /// was already in the snapshot ledger (idempotent duplicate).
    pub async fn record_work_session_atomic(
        &self,
        session: &SessionRecord,
    ) -> Result<bool, AppError> {
        let user_id = session.user_id.clone();
        let now = chrono::Utc::now().to_rfc3339();

        // Streak input: does a work session exist on the previous calendar
        // date? Resolved from session history, not from the snapshot.
        let worked_yesterday = match time_utils::previous_date(&session.date) {
            Some(yesterday) => self.has_work_session_on(&user_id, &yesterday).await?,
            None => false,
        };

        // The task referenced by the session, if any. Read up front; the
        // increment is written inside the transaction.
        let task = match &session.task_id {
            Some(task_id) => self.get_task(task_id).await?,
            None => None,
        };

        // Begin a transaction
        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // 1. Read current stats within the transaction
        //    This registers the document for conflict detection
        let current_stats: Option<UserStats> = self
            .get_client()?
            .clone_with_consistency_selector(firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ))
            .fluent()
            .select()
            .by_id_in(collections::USER_STATS)
            .obj()
            .one(&user_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read stats in transaction: {}", e))
            })?;

        let mut stats = current_stats.unwrap_or_default();

        // 2. Check idempotency - if already processed, skip all writes
        if stats.processed_session_ids.contains(&session.id) {
            tracing::debug!(
                user_id = %user_id,
                session_id = %session.id,
                "Session already processed (idempotent skip)"
            );
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        // 3. Apply the streak rule in memory
        stats.update_from_session(session, worked_yesterday, &now);

        // 4. Add session write to transaction
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::SESSIONS)
            .document_id(&session.id)
            .object(session)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add session to transaction: {}", e))
            })?;

        // 5. Add task pomodoro increment to transaction
        if let Some(mut task) = task {
            task.pomodoros_completed += 1;
            self.get_client()?
                .fluent()
                .update()
                .in_col(collections::TASKS)
                .document_id(&task.id)
                .object(&task)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add task to transaction: {}", e))
                })?;
        }

        // 6. Add stats write to transaction
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_STATS)
            .document_id(&user_id)
            .object(&stats)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add stats to transaction: {}", e))
            })?;

        // 7. Commit the transaction atomically
        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id = %user_id,
            session_id = %session.id,
            streak = stats.current_streak,
            "Work session recorded atomically"
        );

        Ok(true)
    }
}
