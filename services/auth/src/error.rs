//! Error taxonomy for authentication and authorization

use common::error::DatabaseError;
use std::time::Duration;
use thiserror::Error;

use crate::password::PasswordError;

/// Authentication failures at the request boundary
///
/// An absent, malformed or expired token all map to `InvalidToken` so the
/// caller cannot learn which condition applied.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No session cookie and no Authorization header
    #[error("no authorization header")]
    NoAuthHeader,

    /// Authorization header present but not `Bearer <token>`
    #[error("invalid authorization type")]
    InvalidAuthType,

    /// Token unknown or expired
    #[error("invalid token")]
    InvalidToken,
}

/// Failures while resolving identities or permissions
///
/// Permission denial is not an error: it is `Ok(false)`. Every variant here
/// means the decision could not be made and the caller must deny.
#[derive(Error, Debug)]
pub enum AccessError {
    /// The role/permission or credential store failed
    #[error("Store error: {0}")]
    Storage(#[from] DatabaseError),

    /// The user referenced by a session no longer exists
    #[error("Unknown user: {0}")]
    UnknownUser(i64),

    /// The store did not answer within the permission check budget
    #[error("Permission check timed out after {0:?}")]
    Timeout(Duration),

    /// A credential could not be processed
    #[error("Credential error: {0}")]
    Credential(#[from] PasswordError),
}
