//! Application state shared across handlers

use auth::{Authorizer, SessionManager};
use sqlx::SqlitePool;

use crate::repositories::PdfRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub sessions: SessionManager,
    pub authorizer: Authorizer,
    pub pdf_repository: PdfRepository,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, sessions: SessionManager, authorizer: Authorizer) -> Self {
        let pdf_repository = PdfRepository::new(db_pool.clone());
        Self {
            db_pool,
            sessions,
            authorizer,
            pdf_repository,
        }
    }
}
