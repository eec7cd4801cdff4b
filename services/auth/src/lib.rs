//! Session and role-based access control core for the document library
//!
//! - [`session::SessionManager`] issues, validates and expires opaque session
//!   tokens held in memory, swept periodically by [`sweeper::SessionSweeper`].
//! - [`rbac::Authorizer`] resolves identity → role → permission checks and
//!   bootstraps the baseline roles and permissions at startup.
//! - [`token`] extracts tokens from requests and builds session cookies.

pub mod bootstrap;
pub mod error;
pub mod models;
pub mod password;
pub mod rbac;
pub mod repositories;
pub mod session;
pub mod sweeper;
pub mod token;

pub use bootstrap::BootstrapReport;
pub use error::{AccessError, AuthError};
pub use rbac::Authorizer;
pub use session::{SessionConfig, SessionManager};
pub use sweeper::SessionSweeper;
