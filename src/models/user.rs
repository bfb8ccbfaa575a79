//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Server-generated UUID (also used as document ID)
    pub id: String,
    /// Email address, unique per account
    pub email: String,
    /// Salted PBKDF2 password hash. Never serialized into API responses;
    /// route handlers map to response types without this field.
    pub password_hash: String,
    /// Display name
    pub name: String,
    /// Timer preferences
    #[serde(default)]
    pub preferences: Preferences,
    /// When the account was created (ISO 8601)
    pub created_at: String,
    /// Last request timestamp
    pub last_active: String,
}

/// Pomodoro timer preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub pomodoro_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            pomodoro_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            theme: Theme::Light,
        }
    }
}
