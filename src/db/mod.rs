//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TASKS: &str = "tasks";
    pub const SESSIONS: &str = "sessions";
    /// User stats snapshots (keyed by user id)
    pub const USER_STATS: &str = "user_stats";
}
