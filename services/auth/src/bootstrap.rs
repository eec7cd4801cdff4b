//! Startup bootstrap of the role/permission graph
//!
//! Every step is skip-if-exists, so running the bootstrap against an already
//! initialized store changes nothing.

use common::error::DatabaseError;
use serde::Serialize;
use tracing::info;

use crate::{
    error::AccessError,
    models::{Permission, RbacCounts},
    rbac::{ADMIN_ROLE, Authorizer, USER_ROLE, permissions},
};

/// A permission in the fixed catalog
#[derive(Debug, Clone, Copy)]
pub struct PermissionSpec {
    pub name: &'static str,
    pub resource: &'static str,
    pub action: &'static str,
    pub description: &'static str,
}

/// Baseline roles and their descriptions
pub const BASELINE_ROLES: &[(&str, &str)] = &[
    (ADMIN_ROLE, "System administrator with full access"),
    (USER_ROLE, "Regular user with catalog access"),
];

/// The fixed permission catalog; `admin` holds all of it
pub const PERMISSION_CATALOG: &[PermissionSpec] = &[
    PermissionSpec {
        name: permissions::UPLOAD_PDF,
        resource: "pdf",
        action: "create",
        description: "Upload PDF files",
    },
    PermissionSpec {
        name: permissions::VIEW_PDF,
        resource: "pdf",
        action: "read",
        description: "View PDF files",
    },
    PermissionSpec {
        name: permissions::EDIT_PDF,
        resource: "pdf",
        action: "update",
        description: "Edit PDF metadata",
    },
    PermissionSpec {
        name: permissions::DELETE_PDF,
        resource: "pdf",
        action: "delete",
        description: "Delete PDF files",
    },
    PermissionSpec {
        name: permissions::MANAGE_USERS,
        resource: "user",
        action: "manage",
        description: "Manage user accounts",
    },
    PermissionSpec {
        name: permissions::MANAGE_ROLES,
        resource: "role",
        action: "manage",
        description: "Manage user roles",
    },
];

/// Permissions held by the baseline `user` role
pub const USER_ROLE_PERMISSIONS: &[&str] = &[permissions::VIEW_PDF];

/// Outcome of a bootstrap run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    /// Users that had no role and received the baseline role
    pub baseline_grants: u64,
    /// User promoted to administrator because none existed
    pub promoted_admin: Option<i64>,
    /// Graph size after the run
    pub counts: RbacCounts,
}

impl Authorizer {
    /// Establish baseline roles and permissions and guarantee an administrator
    ///
    /// Any error must abort startup: serving requests without a known
    /// permission graph is not allowed.
    pub async fn bootstrap(&self) -> Result<BootstrapReport, AccessError> {
        info!("Bootstrapping roles and permissions");

        for (name, description) in BASELINE_ROLES {
            self.roles.create_role_if_missing(name, description).await?;
        }

        for spec in PERMISSION_CATALOG {
            self.roles
                .create_permission_if_missing(
                    spec.name,
                    spec.resource,
                    spec.action,
                    spec.description,
                )
                .await?;
        }

        let admin = self.require_role(ADMIN_ROLE).await?;
        let user = self.require_role(USER_ROLE).await?;

        for spec in PERMISSION_CATALOG {
            let permission = self.require_permission(spec.name).await?;
            self.roles.attach_permission(admin.id, permission.id).await?;
        }

        for name in USER_ROLE_PERMISSIONS {
            let permission = self.require_permission(name).await?;
            self.roles.attach_permission(user.id, permission.id).await?;
        }

        let baseline_grants = self.roles.assign_to_users_without_roles(user.id).await?;
        if baseline_grants > 0 {
            info!(
                "Granted role {} to {} users without roles",
                USER_ROLE, baseline_grants
            );
        }

        let mut promoted_admin = None;
        if self.roles.role_holders(admin.id).await?.is_empty() {
            if let Some(first) = self.users.find_earliest().await? {
                self.roles.assign_role(first.id, admin.id, None).await?;
                info!(
                    "No administrator found, promoted earliest user {} to {}",
                    first.username, ADMIN_ROLE
                );
                promoted_admin = Some(first.id);
            }
        }

        let counts = self.roles.counts().await?;
        info!(
            "RBAC bootstrap complete: {} roles, {} permissions, {} role permissions, {} assignments",
            counts.roles, counts.permissions, counts.role_permissions, counts.assignments
        );

        Ok(BootstrapReport {
            baseline_grants,
            promoted_admin,
            counts,
        })
    }

    async fn require_permission(&self, name: &str) -> Result<Permission, AccessError> {
        self.roles
            .find_permission_by_name(name)
            .await?
            .ok_or_else(|| {
                AccessError::Storage(DatabaseError::NotFound(format!("permission {}", name)))
            })
    }
}
