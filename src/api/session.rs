use axum::{Extension, Json, Router, extract::State, middleware, routing::get};
use serde::Serialize;

use super::error::{ApiError, ResultExt};
use crate::auth::{AuthError, Session, SessionManager, require_session};

pub fn router(sessions: SessionManager) -> Router {
    Router::new()
        .route("/session", get(current_session))
        .route_layer(middleware::from_fn_with_state(
            sessions.clone(),
            require_session,
        ))
        .with_state(sessions)
}

#[derive(Serialize)]
struct SessionResponse {
    session_id: String,
    user_id: String,
    username: String,
    expires_at: i64,
}

/// Describe the caller's session. The username comes from the store, not
/// from the token claims.
async fn current_session(
    State(sessions): State<SessionManager>,
    Extension(session): Extension<Session>,
) -> Result<Json<SessionResponse>, ApiError> {
    let username = match sessions.lookup_username_by_session_id(&session.id).await {
        // Swept between the gate and this lookup
        Err(AuthError::NotFound) => Err(AuthError::Unauthorized),
        other => other,
    }
    .auth_err("Failed to look up session owner")?;

    Ok(Json(SessionResponse {
        session_id: session.id,
        user_id: session.user_id,
        username,
        expires_at: session.expires_at,
    }))
}
