//! Repositories backing the authorization core

pub mod role;
pub mod user;

pub use role::RoleRepository;
pub use user::UserRepository;
