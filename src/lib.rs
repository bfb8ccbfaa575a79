// SPDX-License-Identifier: MIT

//! Study Planner: backend API for study tasks, Pomodoro sessions, and
//! productivity analytics.
//!
//! This crate provides the JSON API consumed by the web dashboard, plus
//! the streak/aggregation engine that turns recorded sessions into stats.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
}
