mod error;
mod logging;
mod session;
mod users;

use axum::Router;

use crate::auth::{Credentials, SessionManager};

pub use error::{ApiError, INVALID_LOGIN_MESSAGE};
pub use logging::log_requests;

/// Create the API router.
pub fn create_api_router(credentials: Credentials, sessions: SessionManager) -> Router {
    let users_state = users::UsersState {
        credentials,
        sessions: sessions.clone(),
    };

    Router::new()
        .merge(users::router(users_state))
        .merge(session::router(sessions))
}
