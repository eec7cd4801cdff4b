//! Repositories for database operations

use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::SqlitePool;
use tracing::info;

use crate::models::{Pdf, PdfAccess, UploadForm};

const PDF_COLUMNS: &str =
    "id, title, author, description, filename, file_path, uploaded_by, created_at";

/// Maximum number of history entries returned for a user
const HISTORY_LIMIT: i64 = 50;

/// PDF catalog repository
#[derive(Clone)]
pub struct PdfRepository {
    pool: SqlitePool,
}

impl PdfRepository {
    /// Create a new PDF repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every catalog entry, newest first
    pub async fn list_all(&self) -> DatabaseResult<Vec<Pdf>> {
        sqlx::query_as::<_, Pdf>(&format!(
            "SELECT {} FROM pdfs ORDER BY created_at DESC, id DESC",
            PDF_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Find a catalog entry by id
    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Pdf>> {
        sqlx::query_as::<_, Pdf>(&format!("SELECT {} FROM pdfs WHERE id = ?", PDF_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Store the metadata of an uploaded file
    pub async fn create(
        &self,
        form: &UploadForm,
        file_path: &str,
        uploaded_by: i64,
    ) -> DatabaseResult<Pdf> {
        info!("Adding PDF {} uploaded by user {}", form.filename, uploaded_by);

        sqlx::query_as::<_, Pdf>(&format!(
            "INSERT INTO pdfs (title, author, description, filename, file_path, uploaded_by, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            PDF_COLUMNS
        ))
        .bind(&form.title)
        .bind(&form.author)
        .bind(&form.description)
        .bind(&form.filename)
        .bind(file_path)
        .bind(uploaded_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    /// Update the metadata of an entry; `false` if it does not exist
    pub async fn update(
        &self,
        id: i64,
        title: &str,
        author: &str,
        description: &str,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE pdfs SET title = ?, author = ?, description = ? WHERE id = ?",
        )
        .bind(title)
        .bind(author)
        .bind(description)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an entry and its access history; `false` if it does not exist
    pub async fn delete(&self, id: i64) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM pdfs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    /// Record that a user opened an entry
    pub async fn record_access(&self, user_id: i64, pdf_id: i64) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO user_pdf_access (user_id, pdf_id, accessed_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(pdf_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    /// A user's most recent accesses, newest first
    pub async fn history(&self, user_id: i64) -> DatabaseResult<Vec<PdfAccess>> {
        sqlx::query_as::<_, PdfAccess>(
            "SELECT a.pdf_id, p.title, a.accessed_at \
             FROM user_pdf_access a \
             JOIN pdfs p ON p.id = a.pdf_id \
             WHERE a.user_id = ? \
             ORDER BY a.accessed_at DESC, a.id DESC \
             LIMIT ?",
        )
        .bind(user_id)
        .bind(HISTORY_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::database::{DatabaseConfig, init_pool};

    async fn setup() -> (SqlitePool, PdfRepository, i64) {
        let pool = init_pool(&DatabaseConfig::in_memory()).await.unwrap();
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO users (username, email, password_hash, created_at) \
             VALUES ('uploader', 'uploader@example.com', 'x', ?) RETURNING id",
        )
        .bind(Utc::now())
        .fetch_one(&pool)
        .await
        .unwrap();
        let repository = PdfRepository::new(pool.clone());
        (pool, repository, row.0)
    }

    fn form(title: &str) -> UploadForm {
        UploadForm {
            title: title.to_string(),
            author: "Author".to_string(),
            description: String::new(),
            filename: format!("{}.pdf", title),
        }
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let (_pool, repository, user_id) = setup().await;

        let pdf = repository
            .create(&form("manual"), "uploads/manual.pdf", user_id)
            .await
            .unwrap();
        assert_eq!(pdf.uploaded_by, user_id);

        assert!(repository.update(pdf.id, "Manual", "Someone", "Updated").await.unwrap());
        let updated = repository.find_by_id(pdf.id).await.unwrap().unwrap();
        assert_eq!(updated.title, "Manual");
        assert_eq!(updated.description, "Updated");

        assert!(repository.delete(pdf.id).await.unwrap());
        assert!(!repository.delete(pdf.id).await.unwrap());
        assert!(repository.find_by_id(pdf.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_follows_deletes() {
        let (_pool, repository, user_id) = setup().await;
        let first = repository.create(&form("first"), "uploads/first.pdf", user_id).await.unwrap();
        let second = repository.create(&form("second"), "uploads/second.pdf", user_id).await.unwrap();

        repository.record_access(user_id, first.id).await.unwrap();
        repository.record_access(user_id, second.id).await.unwrap();

        let history = repository.history(user_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].pdf_id, second.id);

        repository.delete(second.id).await.unwrap();
        let history = repository.history(user_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].title, "first");
    }
}
