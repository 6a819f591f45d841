use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ResultExt};
use crate::auth::{Credentials, SessionManager};

/// bcrypt only reads the first 72 bytes of its input.
const MAX_PASSWORD_BYTES: usize = 72;
const MIN_PASSWORD_BYTES: usize = 8;
const MAX_USERNAME_LEN: usize = 32;

#[derive(Clone)]
pub struct UsersState {
    pub credentials: Credentials,
    pub sessions: SessionManager,
}

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state)
}

#[derive(Deserialize)]
struct CredentialsRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct TokenResponse {
    token: String,
}

fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::bad_request("Username cannot be empty"));
    }

    if username.len() > MAX_USERNAME_LEN {
        return Err(ApiError::bad_request(
            "Username cannot be longer than 32 characters",
        ));
    }

    // Only allow alphanumeric and underscores
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ApiError::bad_request(
            "Username can only contain letters, numbers, and underscores",
        ));
    }

    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_BYTES {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ApiError::bad_request(
            "Password cannot be longer than 72 bytes",
        ));
    }

    Ok(())
}

async fn register(
    State(state): State<UsersState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = payload.username.trim();
    validate_username(username)?;
    validate_password(&payload.password)?;

    let identity = state
        .credentials
        .register(username, &payload.password)
        .await
        .auth_err("Failed to register user")?;

    let session = state
        .sessions
        .create(&identity)
        .await
        .auth_err("Failed to create session")?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse { token: session.id }),
    ))
}

async fn login(
    State(state): State<UsersState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let identity = state
        .credentials
        .verify(payload.username.trim(), &payload.password)
        .await
        .auth_err("Failed to verify credentials")?;

    let session = state
        .sessions
        .create(&identity)
        .await
        .auth_err("Failed to create session")?;

    Ok(Json(TokenResponse { token: session.id }))
}
