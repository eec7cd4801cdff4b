//! Role and permission repository for database operations
//!
//! Every write here is either skip-if-exists or an upsert so that repeated
//! bootstrap runs and repeated admin actions never fail or duplicate rows.

use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::SqlitePool;

use crate::models::{Permission, RbacCounts, Role, UserRole};

/// Role repository
#[derive(Clone)]
pub struct RoleRepository {
    pool: SqlitePool,
}

impl RoleRepository {
    /// Create a new role repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a role unless one with the same name exists
    pub async fn create_role_if_missing(&self, name: &str, description: &str) -> DatabaseResult<()> {
        sqlx::query("INSERT OR IGNORE INTO roles (name, description, created_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(description)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(())
    }

    /// Create a permission unless one with the same name exists
    pub async fn create_permission_if_missing(
        &self,
        name: &str,
        resource: &str,
        action: &str,
        description: &str,
    ) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO permissions (name, resource, action, description, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(resource)
        .bind(action)
        .bind(description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(())
    }

    /// Attach a permission to a role unless already attached
    pub async fn attach_permission(&self, role_id: i64, permission_id: i64) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO role_permissions (role_id, permission_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(role_id)
        .bind(permission_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(())
    }

    /// Find a role by name
    pub async fn find_role_by_name(&self, name: &str) -> DatabaseResult<Option<Role>> {
        sqlx::query_as::<_, Role>(
            "SELECT id, name, description, created_at FROM roles WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Find a role by ID
    pub async fn find_role_by_id(&self, id: i64) -> DatabaseResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT id, name, description, created_at FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Find a permission by name
    pub async fn find_permission_by_name(&self, name: &str) -> DatabaseResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>(
            r#"
            SELECT id, name, resource, action, description, created_at
            FROM permissions
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// All roles, ordered by name
    pub async fn list_roles(&self) -> DatabaseResult<Vec<Role>> {
        sqlx::query_as::<_, Role>("SELECT id, name, description, created_at FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Permissions attached to a role
    pub async fn role_permissions(&self, role_id: i64) -> DatabaseResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>(
            r#"
            SELECT p.id, p.name, p.resource, p.action, p.description, p.created_at
            FROM permissions p
            INNER JOIN role_permissions rp ON p.id = rp.permission_id
            WHERE rp.role_id = ?
            ORDER BY p.name
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Roles assigned to a user, without their permissions
    pub async fn user_roles(&self, user_id: i64) -> DatabaseResult<Vec<Role>> {
        sqlx::query_as::<_, Role>(
            r#"
            SELECT r.id, r.name, r.description, r.created_at
            FROM roles r
            INNER JOIN user_roles ur ON r.id = ur.role_id
            WHERE ur.user_id = ?
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Whether any role assigned to the user carries the named permission
    pub async fn has_permission(&self, user_id: i64, permission_name: &str) -> DatabaseResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM user_roles ur
            INNER JOIN role_permissions rp ON ur.role_id = rp.role_id
            INNER JOIN permissions p ON rp.permission_id = p.id
            WHERE ur.user_id = ? AND p.name = ?
            "#,
        )
        .bind(user_id)
        .bind(permission_name)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(count > 0)
    }

    /// Grant a role, overwriting the granter if the pair already exists
    pub async fn assign_role(
        &self,
        user_id: i64,
        role_id: i64,
        assigned_by: Option<i64>,
    ) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id, assigned_by, assigned_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id, role_id) DO UPDATE SET
            assigned_by = excluded.assigned_by,
            assigned_at = excluded.assigned_at
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .bind(assigned_by)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    /// Revoke a role; returns whether a grant existed
    pub async fn remove_role(&self, user_id: i64, role_id: i64) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role_id = ?")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    /// The grant record for a (user, role) pair
    pub async fn find_assignment(&self, user_id: i64, role_id: i64) -> DatabaseResult<Option<UserRole>> {
        sqlx::query_as::<_, UserRole>(
            r#"
            SELECT user_id, role_id, assigned_by, assigned_at
            FROM user_roles
            WHERE user_id = ? AND role_id = ?
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// IDs of every user holding a role, in creation order
    pub async fn role_holders(&self, role_id: i64) -> DatabaseResult<Vec<i64>> {
        sqlx::query_scalar("SELECT user_id FROM user_roles WHERE role_id = ? ORDER BY user_id")
            .bind(role_id)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Grant a role to every user that has no role at all
    ///
    /// Returns the number of users that received the role.
    pub async fn assign_to_users_without_roles(&self, role_id: i64) -> DatabaseResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id, assigned_by, assigned_at)
            SELECT u.id, ?, NULL, ?
            FROM users u
            WHERE NOT EXISTS (SELECT 1 FROM user_roles ur WHERE ur.user_id = u.id)
            "#,
        )
        .bind(role_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected())
    }

    /// Row counts of the role/permission graph
    pub async fn counts(&self) -> DatabaseResult<RbacCounts> {
        let (roles, permissions, role_permissions, assignments): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM roles),
                    (SELECT COUNT(*) FROM permissions),
                    (SELECT COUNT(*) FROM role_permissions),
                    (SELECT COUNT(*) FROM user_roles)
                "#,
            )
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(RbacCounts {
            roles,
            permissions,
            role_permissions,
            assignments,
        })
    }
}
