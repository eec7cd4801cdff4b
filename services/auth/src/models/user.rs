//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Role;

/// User entity
///
/// The password hash never leaves the credential verification boundary, so it
/// is skipped when the record is serialized.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// New user registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// Plaintext password, hashed before it reaches the store
    pub password: String,
}

/// An authenticated user together with the roles resolved for it
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub roles: Vec<Role>,
}

impl Identity {
    /// Attach resolved roles to a user record
    pub fn new(user: User, roles: Vec<Role>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            roles,
        }
    }

    /// Whether one of the resolved roles carries the given name
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|role| role.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 7,
            username: "reader".to_string(),
            email: "reader@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let json = serde_json::to_string(&user()).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret"));
        assert!(json.contains("reader@example.com"));
    }

    #[test]
    fn test_identity_role_lookup() {
        let role = Role {
            id: 1,
            name: "user".to_string(),
            description: "Regular user with catalog access".to_string(),
            created_at: Utc::now(),
        };
        let identity = Identity::new(user(), vec![role]);

        assert_eq!(identity.id, 7);
        assert!(identity.has_role("user"));
        assert!(!identity.has_role("admin"));
    }
}
