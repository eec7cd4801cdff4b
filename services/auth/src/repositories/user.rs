//! User repository for database operations

use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::SqlitePool;
use tracing::info;

use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user and grant it a role in the same transaction
    ///
    /// `password_hash` must already be hashed; the plaintext on `new_user`
    /// is not read here.
    pub async fn create_with_role(
        &self,
        new_user: &NewUser,
        password_hash: &str,
        role_id: i64,
    ) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.username);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, created_at) \
             VALUES (?, ?, ?, ?) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(password_hash)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_query)?;

        sqlx::query("INSERT INTO user_roles (user_id, role_id, assigned_at) VALUES (?, ?, ?)")
            .bind(user.id)
            .bind(role_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_query)?;

        tx.commit().await.map_err(DatabaseError::Query)?;

        Ok(user)
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// The earliest-created user, if any user exists
    pub async fn find_earliest(&self) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY id ASC LIMIT 1",
            USER_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// All users, ordered by username
    pub async fn list_all(&self) -> DatabaseResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY username",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }
}
