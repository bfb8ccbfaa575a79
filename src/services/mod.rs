// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod analytics;
pub mod password;

pub use analytics::{Achievement, DailyBucket, SubjectBucket, WindowTotals};
