pub mod api;
pub mod auth;
pub mod cleanup;
pub mod cli;
pub mod db;
pub mod jwt;

use api::{create_api_router, log_requests};
use auth::{Credentials, SessionManager};
use axum::{Router, middleware};
use cleanup::CleanupHandle;
use db::Database;
use jwt::JwtConfig;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Session token lifetime in seconds
    pub session_duration: u64,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
}

impl ServerConfig {
    /// Session manager sharing this config's database and signing key.
    pub fn session_manager(&self) -> SessionManager {
        let jwt = Arc::new(JwtConfig::with_duration(
            &self.jwt_secret,
            self.session_duration,
        ));
        SessionManager::new(&self.db, jwt)
    }
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let credentials = Credentials::new(&config.db, config.bcrypt_cost);
    let api_router = create_api_router(credentials, config.session_manager());

    Router::new()
        .nest("/api", api_router)
        .layer(middleware::from_fn(log_requests))
}

/// Run one sweep, then spawn the background sweeper.
/// Call this before starting the server and `stop` the handle on shutdown.
pub async fn init_cleanup(config: &ServerConfig) -> CleanupHandle {
    let sessions = config.session_manager();
    cleanup::run_cleanup(&sessions).await;
    cleanup::spawn_cleanup_scheduler(sessions, cleanup::sweep_interval(config.session_duration))
}

/// Run the server on the given listener until `shutdown` resolves.
pub async fn run_server<F>(
    config: &ServerConfig,
    listener: TcpListener,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_app(config);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
