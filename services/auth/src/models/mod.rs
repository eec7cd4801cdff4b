//! Authorization core models

pub mod role;
pub mod session;
pub mod user;

// Re-export for convenience
pub use role::{Permission, RbacCounts, Role, RoleWithPermissions, UserRole};
pub use session::Session;
pub use user::{Identity, NewUser, User};
