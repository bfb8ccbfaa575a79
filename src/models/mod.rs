// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod session;
pub mod stats;
pub mod task;
pub mod user;

pub use session::{SessionKind, SessionRecord};
pub use stats::UserStats;
pub use task::{Task, TaskPriority};
pub use user::{Preferences, User};
