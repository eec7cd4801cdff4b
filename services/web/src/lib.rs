//! HTTP surface of the document library
//!
//! Wires the session and authorization core from the `auth` crate into an
//! axum router: a session middleware resolves the caller's identity and each
//! handler checks the permission it needs before touching the catalog.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;

pub use routes::create_router;
pub use state::AppState;
