// SPDX-License-Identifier: MIT

//! Email/password authentication routes.
//!
//! Sessions are carried by an HTTP-only JWT cookie valid for 7 days.
//! Cookie attributes depend on the configured frontend URL so local dev
//! (http) and production (https) both work.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE, SESSION_TTL_SECONDS};
use crate::models::{User, UserStats};
use crate::routes::api::UserResponse;
use crate::services::password;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
}

/// Create an account and start a session.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    if state.db.get_user_by_email(&payload.email).await?.is_some() {
        return Err(AppError::BadRequest(
            "An account with this email already exists".to_string(),
        ));
    }

    let password_hash = password::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?;

    let now = format_utc_rfc3339(chrono::Utc::now());
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email: payload.email,
        password_hash,
        name: payload.name,
        preferences: Default::default(),
        created_at: now.clone(),
        last_active: now,
    };

    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "User created");

    let jwt = create_jwt(&user.id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;
    let jar = jar.add(session_cookie(&state.config, jwt));

    let body = UserResponse::from_parts(&user, &UserStats::default());
    Ok((jar, (StatusCode::CREATED, Json(body))))
}

/// Exchange credentials for a session cookie.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    // Unknown email and wrong password are indistinguishable to the caller
    let Some(mut user) = state.db.get_user_by_email(&payload.email).await? else {
        return Err(AppError::Unauthorized);
    };

    let valid = password::verify_password(&payload.password, &user.password_hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password verification failed: {}", e)))?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    user.last_active = format_utc_rfc3339(chrono::Utc::now());
    state.db.upsert_user(&user).await?;

    let stats = state
        .db
        .get_user_stats(&user.id)
        .await?
        .unwrap_or_default();

    let jwt = create_jwt(&user.id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;
    let jar = jar.add(session_cookie(&state.config, jwt));

    Ok((jar, Json(UserResponse::from_parts(&user, &stats))))
}

/// End the session by expiring the cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(removal_cookie(&state.config));
    (jar, StatusCode::NO_CONTENT)
}

/// Session cookie with creation attributes.
fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::seconds(SESSION_TTL_SECONDS as i64));
    cookie.set_secure(is_https_frontend(config));
    cookie
}

/// Removal cookie whose attributes mirror the creation attributes, so the
/// browser actually drops it.
fn removal_cookie(config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::ZERO);
    cookie.set_secure(is_https_frontend(config));
    cookie
}

fn is_https_frontend(config: &Config) -> bool {
    config.frontend_url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn https_config() -> Config {
        let mut config = Config::test_default();
        config.frontend_url = "https://planner.example.com".to_string();
        config
    }

    #[test]
    fn test_session_cookie_localhost_attributes() {
        let cookie = session_cookie(&Config::test_default(), "token".to_string());
        let rendered = cookie.to_string();

        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn test_session_cookie_production_is_secure() {
        let cookie = session_cookie(&https_config(), "token".to_string());
        assert!(cookie.to_string().contains("Secure"));
    }

    #[test]
    fn test_removal_cookie_mirrors_creation_attributes() {
        let created = session_cookie(&https_config(), "token".to_string());
        let removed = removal_cookie(&https_config());

        assert_eq!(created.path(), removed.path());
        assert_eq!(created.http_only(), removed.http_only());
        assert_eq!(created.same_site(), removed.same_site());
        assert_eq!(created.secure(), removed.secure());
        assert!(removed.to_string().contains("Max-Age=0"));
    }
}
