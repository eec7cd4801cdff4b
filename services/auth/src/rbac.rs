//! Authorization resolver
//!
//! Answers permission questions by traversing user → role → permission in
//! the store on every check. Nothing is cached, so a role change applies to
//! the next check that reads it.

use std::time::Duration;

use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::{
    error::AccessError,
    models::{Identity, NewUser, Role, RoleWithPermissions, User, UserRole},
    password::{hash_password, verify_password},
    repositories::{RoleRepository, UserRepository},
};

/// Name of the administrator role
pub const ADMIN_ROLE: &str = "admin";
/// Name of the baseline role every user holds
pub const USER_ROLE: &str = "user";

/// Permission names known to the application
pub mod permissions {
    pub const UPLOAD_PDF: &str = "upload_pdf";
    pub const VIEW_PDF: &str = "view_pdf";
    pub const EDIT_PDF: &str = "edit_pdf";
    pub const DELETE_PDF: &str = "delete_pdf";
    pub const MANAGE_USERS: &str = "manage_users";
    pub const MANAGE_ROLES: &str = "manage_roles";
}

/// Default upper bound for a single permission check
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Authorization resolver over the user and role stores
#[derive(Clone)]
pub struct Authorizer {
    pub(crate) users: UserRepository,
    pub(crate) roles: RoleRepository,
    check_timeout: Duration,
}

impl Authorizer {
    /// Create an authorizer over a connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            roles: RoleRepository::new(pool),
            check_timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }

    /// Bound every [`Authorizer::authorize`] call by `timeout`
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    /// Whether any role assigned to the user carries the named permission
    pub async fn has_permission(
        &self,
        user_id: i64,
        permission_name: &str,
    ) -> Result<bool, AccessError> {
        Ok(self.roles.has_permission(user_id, permission_name).await?)
    }

    /// Decide whether an identity may use a permission
    ///
    /// A missing identity is denied. Store failures and timeouts are errors,
    /// never grants.
    pub async fn authorize(
        &self,
        identity: Option<&Identity>,
        permission_name: &str,
    ) -> Result<bool, AccessError> {
        let Some(identity) = identity else {
            return Ok(false);
        };

        let check = self.has_permission(identity.id, permission_name);
        match tokio::time::timeout(self.check_timeout, check).await {
            Ok(Ok(granted)) => {
                if !granted {
                    warn!(
                        "User {} denied permission {}",
                        identity.username, permission_name
                    );
                }
                Ok(granted)
            }
            Ok(Err(e)) => {
                error!(
                    "Permission check {} for user {} failed: {}",
                    permission_name, identity.id, e
                );
                Err(e)
            }
            Err(_) => {
                error!(
                    "Permission check {} for user {} timed out after {:?}",
                    permission_name, identity.id, self.check_timeout
                );
                Err(AccessError::Timeout(self.check_timeout))
            }
        }
    }

    /// Roles assigned to a user, without their permissions
    pub async fn get_user_roles(&self, user_id: i64) -> Result<Vec<Role>, AccessError> {
        Ok(self.roles.user_roles(user_id).await?)
    }

    /// Load a user together with its roles
    pub async fn resolve_identity_with_roles(&self, user_id: i64) -> Result<Identity, AccessError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AccessError::UnknownUser(user_id))?;
        let roles = self.get_user_roles(user_id).await?;

        Ok(Identity::new(user, roles))
    }

    /// Grant a role; granting it again only updates the granter
    pub async fn assign_role(
        &self,
        user_id: i64,
        role_id: i64,
        granted_by: Option<i64>,
    ) -> Result<(), AccessError> {
        info!(
            "Assigning role {} to user {} (granted by {:?})",
            role_id, user_id, granted_by
        );
        Ok(self.roles.assign_role(user_id, role_id, granted_by).await?)
    }

    /// Revoke a role; revoking a role the user does not hold is a no-op
    pub async fn remove_role(&self, user_id: i64, role_id: i64) -> Result<(), AccessError> {
        if self.roles.remove_role(user_id, role_id).await? {
            info!("Removed role {} from user {}", role_id, user_id);
        }
        Ok(())
    }

    /// The grant record for a (user, role) pair
    pub async fn find_assignment(
        &self,
        user_id: i64,
        role_id: i64,
    ) -> Result<Option<UserRole>, AccessError> {
        Ok(self.roles.find_assignment(user_id, role_id).await?)
    }

    /// Look up a role by name
    pub async fn find_role(&self, name: &str) -> Result<Option<Role>, AccessError> {
        Ok(self.roles.find_role_by_name(name).await?)
    }

    /// Look up a role by id
    pub async fn find_role_by_id(&self, role_id: i64) -> Result<Option<Role>, AccessError> {
        Ok(self.roles.find_role_by_id(role_id).await?)
    }

    /// IDs of every user holding the named role, in creation order
    pub async fn role_holders(&self, role_name: &str) -> Result<Vec<i64>, AccessError> {
        match self.roles.find_role_by_name(role_name).await? {
            Some(role) => Ok(self.roles.role_holders(role.id).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Every role with its permission set
    pub async fn list_roles(&self) -> Result<Vec<RoleWithPermissions>, AccessError> {
        let mut result = Vec::new();
        for role in self.roles.list_roles().await? {
            let permissions = self.roles.role_permissions(role.id).await?;
            result.push(RoleWithPermissions { role, permissions });
        }
        Ok(result)
    }

    /// Every user with its roles, ordered by username
    pub async fn list_identities(&self) -> Result<Vec<Identity>, AccessError> {
        let mut result = Vec::new();
        for user in self.users.list_all().await? {
            let roles = self.roles.user_roles(user.id).await?;
            result.push(Identity::new(user, roles));
        }
        Ok(result)
    }

    /// Register a new user holding the baseline role
    pub async fn register_identity(&self, new_user: &NewUser) -> Result<User, AccessError> {
        let baseline = self.require_role(USER_ROLE).await?;
        let password_hash = hash_password(&new_user.password)?;

        let user = self
            .users
            .create_with_role(new_user, &password_hash, baseline.id)
            .await?;

        info!("Registered user {} with role {}", user.username, USER_ROLE);
        Ok(user)
    }

    /// Verify a username/password pair
    ///
    /// Returns the user on success and `None` for an unknown user or a wrong
    /// password, without telling the two apart.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AccessError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            warn!("Login attempt for unknown user: {}", username);
            return Ok(None);
        };

        if verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            warn!("Login attempt with wrong password for user: {}", username);
            Ok(None)
        }
    }

    pub(crate) async fn require_role(&self, name: &str) -> Result<Role, AccessError> {
        self.roles.find_role_by_name(name).await?.ok_or_else(|| {
            AccessError::Storage(common::error::DatabaseError::NotFound(format!(
                "role {}",
                name
            )))
        })
    }
}
