//! Scheduled sweep of expired sessions.
//!
//! Expired records are already rejected by `SessionManager::validate`, so
//! this only reclaims storage. A failed sweep is logged and retried on the
//! next tick.

use crate::auth::SessionManager;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Sweep interval for a given token duration: twice per TTL, at least 1 second.
pub fn sweep_interval(token_duration_secs: u64) -> Duration {
    Duration::from_secs((token_duration_secs / 2).max(1))
}

/// Run the session sweep once.
pub async fn run_cleanup(sessions: &SessionManager) {
    match sessions.sweep_expired().await {
        Ok(count) if count > 0 => info!("Cleaned up {} expired sessions", count),
        Ok(_) => {}
        Err(e) => error!("Failed to clean up expired sessions: {}", e),
    }
}

/// Handle to the background sweeper.
pub struct CleanupHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CleanupHandle {
    /// Signal the loop to stop and wait for it. A sweep already in progress
    /// runs to completion first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!("Session sweeper task failed: {}", e);
        }
    }
}

/// Spawn a background task that sweeps expired sessions every `period`.
/// The first sweep runs immediately. Dropping the handle also stops the loop.
pub fn spawn_cleanup_scheduler(sessions: SessionManager, period: Duration) -> CleanupHandle {
    let (shutdown, mut stop) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => run_cleanup(&sessions).await,
                _ = stop.changed() => break,
            }
        }
    });

    CleanupHandle { shutdown, task }
}
