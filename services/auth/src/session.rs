//! In-memory session management
//!
//! Sessions live in a process-wide registry guarded by a single mutex. They
//! are never persisted: a restart logs everyone out. Expiry is absolute
//! (creation time + TTL) and is enforced lazily on lookup and eagerly by the
//! periodic sweep in [`crate::sweeper`].

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{error::AuthError, models::Session, token::generate_token};

/// Session manager configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session lifetime in seconds (default: 24 hours)
    pub ttl_seconds: i64,
    /// Cron schedule of the expired-session sweep (default: hourly)
    pub sweep_schedule: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 86400,                       // 24 hours
            sweep_schedule: "0 0 * * * *".to_string(), // top of every hour
        }
    }
}

impl SessionConfig {
    /// Create a new SessionConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SESSION_TTL_SECONDS`: Session lifetime in seconds (default: 86400)
    /// - `SESSION_SWEEP_SCHEDULE`: Cron expression for the sweep (default: "0 0 * * * *")
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let ttl_seconds = match std::env::var("SESSION_TTL_SECONDS") {
            Ok(value) => value
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid SESSION_TTL_SECONDS {:?}: {}", value, e))?,
            Err(_) => defaults.ttl_seconds,
        };

        if ttl_seconds <= 0 {
            anyhow::bail!("SESSION_TTL_SECONDS must be positive, got {}", ttl_seconds);
        }

        let sweep_schedule =
            std::env::var("SESSION_SWEEP_SCHEDULE").unwrap_or(defaults.sweep_schedule);

        Ok(SessionConfig {
            ttl_seconds,
            sweep_schedule,
        })
    }

    /// Session lifetime
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_seconds)
    }
}

/// Session manager owning the token registry
///
/// Cloning is cheap and every clone shares the same registry.
#[derive(Debug, Clone)]
pub struct SessionManager {
    config: SessionConfig,
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionManager {
    /// Create a new session manager with an empty registry
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get the session manager configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Create a new session for a user and return its token
    pub async fn create_session(&self, user_id: i64, username: &str) -> String {
        self.create_session_at(user_id, username, Utc::now()).await
    }

    /// Create a new session as of `now`
    pub async fn create_session_at(
        &self,
        user_id: i64,
        username: &str,
        now: DateTime<Utc>,
    ) -> String {
        info!("Creating session for user: {}", user_id);

        let token = generate_token();
        let session = Session {
            token: token.clone(),
            user_id,
            username: username.to_string(),
            created_at: now,
            expires_at: now + self.config.ttl(),
        };

        self.sessions.lock().await.insert(token.clone(), session);

        token
    }

    /// Look up a session by token
    ///
    /// Expired sessions are evicted on the spot and reported exactly like
    /// unknown ones.
    pub async fn validate_session(&self, token: &str) -> Result<Session, AuthError> {
        self.validate_session_at(token, Utc::now()).await
    }

    /// Look up a session by token as of `now`
    pub async fn validate_session_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, AuthError> {
        let mut sessions = self.sessions.lock().await;

        let session = sessions.get(token).ok_or(AuthError::InvalidToken)?;

        if session.is_expired_at(now) {
            debug!("Evicting expired session for user: {}", session.user_id);
            sessions.remove(token);
            return Err(AuthError::InvalidToken);
        }

        Ok(session.clone())
    }

    /// Destroy a session; unknown tokens are ignored
    pub async fn destroy_session(&self, token: &str) {
        if let Some(session) = self.sessions.lock().await.remove(token) {
            info!("Destroyed session for user: {}", session.user_id);
        }
    }

    /// Evict every expired session and return how many were removed
    pub async fn cleanup_expired_sessions(&self) -> usize {
        self.cleanup_expired_sessions_at(Utc::now()).await
    }

    /// Evict every session expired as of `now`
    pub async fn cleanup_expired_sessions_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();

        sessions.retain(|_, session| !session.is_expired_at(now));

        before - sessions.len()
    }

    /// Number of sessions currently held, expired or not
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
