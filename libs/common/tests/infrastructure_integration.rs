//! Integration tests for the infrastructure components
//!
//! These tests verify that the SQLite database is properly configured,
//! carries the expected schema and reports constraint violations in a way
//! callers can tell apart from other failures.

use common::{
    database::{DatabaseConfig, health_check, init_pool},
    error::DatabaseError,
};
use sqlx::Row;

/// Test that verifies the database is accessible and can perform basic operations
#[tokio::test]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::in_memory()).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i64 = row.get("result");
    assert_eq!(result, 1, "SQLite simple query test failed");

    sqlx::query("INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)")
        .bind("alice")
        .bind("alice@example.com")
        .bind("hash")
        .execute(&pool)
        .await?;

    let username: String = sqlx::query_scalar("SELECT username FROM users WHERE id = 1")
        .fetch_one(&pool)
        .await?;
    assert_eq!(username, "alice");

    Ok(())
}

#[tokio::test]
async fn test_unique_violation_is_classified() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::in_memory()).await?;

    sqlx::query("INSERT INTO roles (name, description) VALUES ('admin', 'first')")
        .execute(&pool)
        .await?;

    let err = sqlx::query("INSERT INTO roles (name, description) VALUES ('admin', 'second')")
        .execute(&pool)
        .await
        .map_err(DatabaseError::from_query)
        .expect_err("duplicate role name must be rejected");

    assert!(matches!(err, DatabaseError::UniqueViolation(_)));
    Ok(())
}

#[tokio::test]
async fn test_user_roles_are_unique_per_pair() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::in_memory()).await?;

    sqlx::query("INSERT INTO users (username, email, password_hash) VALUES ('bob', 'bob@example.com', 'x')")
        .execute(&pool)
        .await?;
    sqlx::query("INSERT INTO roles (name) VALUES ('user')")
        .execute(&pool)
        .await?;
    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (1, 1)")
        .execute(&pool)
        .await?;

    let duplicate = sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (1, 1)")
        .execute(&pool)
        .await;
    assert!(duplicate.is_err());

    Ok(())
}
