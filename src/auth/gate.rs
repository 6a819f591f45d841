//! Per-request authorization.
//!
//! A request passes only if its bearer token decodes with a valid HS256
//! signature and a live session record exists for the same token string.
//! The resolved [`Session`] is inserted into the request extensions, so
//! handlers behind the gate take `Extension<Session>`.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::error;

use super::errors::{ApiAuthError, AuthError, AuthErrorKind};
use super::header::bearer_token;
use super::sessions::SessionManager;
use super::types::Session;

/// Check the request headers and resolve the session. Never mutates state.
pub async fn authorize(
    headers: &HeaderMap,
    sessions: &SessionManager,
) -> Result<Session, ApiAuthError> {
    let token =
        bearer_token(headers).ok_or(ApiAuthError::new(AuthErrorKind::NotAuthenticated))?;

    match sessions.authenticate(token).await {
        Ok(session) => Ok(session),
        Err(AuthError::Unauthorized) => Err(ApiAuthError::new(AuthErrorKind::InvalidToken)),
        Err(e) => {
            error!(error = %e, "Failed to validate session");
            Err(ApiAuthError::new(AuthErrorKind::DatabaseError))
        }
    }
}

/// Middleware guarding protected routes.
pub async fn require_session(
    State(sessions): State<SessionManager>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiAuthError> {
    let session = authorize(request.headers(), &sessions).await?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
