//! Role and permission models

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Role entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Permission entity, an atomic (resource, action) capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub resource: String,
    pub action: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// User role association
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserRole {
    pub user_id: i64,
    pub role_id: i64,
    /// `None` for grants made by the system bootstrap
    pub assigned_by: Option<i64>,
    pub assigned_at: DateTime<Utc>,
}

/// A role with its permission set expanded
#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// Row counts of the role/permission graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RbacCounts {
    pub roles: i64,
    pub permissions: i64,
    pub role_permissions: i64,
    pub assignments: i64,
}
