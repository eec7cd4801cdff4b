//! Periodic eviction of expired sessions
//!
//! Lookups already evict expired sessions lazily; the sweep bounds the memory
//! held by sessions that are abandoned and never looked up again.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info};

use crate::session::SessionManager;

/// Scheduled sweep over a session registry
#[derive(Clone)]
pub struct SessionSweeper {
    sessions: SessionManager,
    running: Arc<Mutex<()>>,
}

impl SessionSweeper {
    /// Create a sweeper for the given registry
    pub fn new(sessions: SessionManager) -> Self {
        Self {
            sessions,
            running: Arc::new(Mutex::new(())),
        }
    }

    /// Run one sweep
    ///
    /// Returns the number of evicted sessions, or `None` when a previous sweep
    /// is still running and this one was skipped.
    pub async fn sweep_once(&self) -> Option<usize> {
        let Ok(_guard) = self.running.try_lock() else {
            debug!("Session sweep already in progress, skipping");
            return None;
        };

        let removed = self.sessions.cleanup_expired_sessions().await;
        let remaining = self.sessions.session_count().await;
        info!(
            "Session sweep removed {} expired sessions, {} remaining",
            removed, remaining
        );

        Some(removed)
    }

    /// Schedule the sweep on a cron expression and start the scheduler
    ///
    /// The returned scheduler keeps the job alive; shut it down to stop
    /// sweeping.
    pub async fn start(&self, schedule: &str) -> Result<JobScheduler> {
        let sweeper = self.clone();

        let job = Job::new_async(schedule, move |_, _| {
            let sweeper = sweeper.clone();
            Box::pin(async move {
                sweeper.sweep_once().await;
            })
        })
        .map_err(|e| {
            error!("Invalid session sweep schedule {:?}: {}", schedule, e);
            anyhow::anyhow!("Invalid session sweep schedule {:?}: {}", schedule, e)
        })?;

        let scheduler = JobScheduler::new().await?;
        scheduler.add(job).await?;
        scheduler.start().await?;

        info!("Started session sweep scheduler with schedule: {}", schedule);
        Ok(scheduler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_sweep_evicts_expired_sessions() {
        let sessions = SessionManager::new(SessionConfig::default());
        sessions
            .create_session_at(1, "stale", Utc::now() - Duration::hours(30))
            .await;
        let live = sessions.create_session(2, "live").await;

        let sweeper = SessionSweeper::new(sessions.clone());
        assert_eq!(sweeper.sweep_once().await, Some(1));
        assert_eq!(sessions.session_count().await, 1);
        assert!(sessions.validate_session(&live).await.is_ok());
    }

    #[tokio::test]
    async fn test_overlapping_sweep_is_skipped() {
        let sessions = SessionManager::new(SessionConfig::default());
        let sweeper = SessionSweeper::new(sessions);

        let _in_progress = sweeper.running.lock().await;
        assert_eq!(sweeper.sweep_once().await, None);
    }

    #[tokio::test]
    async fn test_invalid_schedule_is_rejected() {
        let sweeper = SessionSweeper::new(SessionManager::new(SessionConfig::default()));
        assert!(sweeper.start("every now and then").await.is_err());
    }
}
