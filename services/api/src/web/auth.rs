//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, and logout. Successful
//! signup and login hand back a bearer token for the protected thought routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use happy_thoughts_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;
use utoipa::ToSchema;
use crate::web::{
    middleware::bearer_token,
    protocol::{Envelope, HttpError},
    state::AppState,
};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
    pub access_token: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> HttpError {
    HttpError::new(StatusCode::UNAUTHORIZED, "Invalid email or password")
}

/// Creates a fresh token for `user_id` that expires after the configured TTL.
async fn issue_token(state: &AppState, user_id: Uuid) -> Result<String, HttpError> {
    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(state.config.token_ttl_days);

    state
        .auth
        .create_auth_session(&token, user_id, expires_at)
        .await
        .map_err(|e| HttpError::from_port(e, "Failed to create session"))?;
    Ok(token)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(req) = payload.map_err(|e| HttpError::new(StatusCode::BAD_REQUEST, e.body_text()))?;

    let email = normalize_email(&req.email);
    if !email.contains('@') || req.password.is_empty() {
        return Err(HttpError::new(
            StatusCode::BAD_REQUEST,
            "A valid email and a password are required",
        ));
    }

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password")
        })?
        .to_string();

    // 2. Create user in database
    let user = state
        .auth
        .create_user_with_email(&email, &password_hash)
        .await
        .map_err(|e| match e {
            PortError::Conflict(message) => HttpError::new(StatusCode::CONFLICT, message),
            other => HttpError::from_port(other, "Failed to create user"),
        })?;

    // 3. Issue a token
    let access_token = issue_token(&state, user.user_id).await?;
    info!("Created account {}", user.user_id);

    let response = AuthResponse {
        user_id: user.user_id,
        email: user.email,
        access_token,
    };
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Account created.", response)),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Envelope<AuthResponse>, HttpError> {
    let Json(req) = payload.map_err(|e| HttpError::new(StatusCode::BAD_REQUEST, e.body_text()))?;

    // 1. Get user by email
    let user_creds = state
        .auth
        .get_user_by_email(&normalize_email(&req.email))
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => invalid_credentials(),
            other => HttpError::from_port(other, "Failed to log in"),
        })?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&user_creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, "Authentication error")
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Err(invalid_credentials());
    }

    // 3. Issue a token
    let access_token = issue_token(&state, user_creds.user_id).await?;

    Ok(Envelope::ok(
        "Logged in.",
        AuthResponse {
            user_id: user_creds.user_id,
            email: user_creds.email,
            access_token,
        },
    ))
}

/// POST /auth/logout - Revoke the presented bearer token
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Envelope<()>, HttpError> {
    let token = bearer_token(&headers).ok_or_else(HttpError::unauthorized)?;

    state
        .auth
        .delete_auth_session(token)
        .await
        .map_err(|e| HttpError::from_port(e, "Failed to logout"))?;

    Ok(Envelope::ok("Logged out.", ()))
}
