//! Session model

use chrono::{DateTime, Utc};

/// In-memory session record, keyed by its token in the session registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session is expired from its expiry instant onwards
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry_boundary_counts_as_expired() {
        let created_at = Utc::now();
        let session = Session {
            token: "t".to_string(),
            user_id: 1,
            username: "alice".to_string(),
            created_at,
            expires_at: created_at + Duration::hours(24),
        };

        assert!(!session.is_expired_at(created_at));
        assert!(!session.is_expired_at(session.expires_at - Duration::milliseconds(1)));
        assert!(session.is_expired_at(session.expires_at));
        assert!(session.is_expired_at(session.expires_at + Duration::seconds(1)));
    }
}
