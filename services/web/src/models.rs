//! Request forms and catalog models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Registration form
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confirm-password")]
    pub confirm_password: String,
}

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// PDF upload form; only the metadata is stored
#[derive(Debug, Deserialize)]
pub struct UploadForm {
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    pub filename: String,
}

/// PDF metadata edit form
#[derive(Debug, Deserialize)]
pub struct EditForm {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
}

/// PDF deletion form
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub id: i64,
}

/// Role assignment or revocation form
#[derive(Debug, Deserialize)]
pub struct RoleChangeForm {
    pub user_id: i64,
    pub role_id: i64,
}

/// PDF catalog entry
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Pdf {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub filename: String,
    pub file_path: String,
    pub uploaded_by: i64,
    pub created_at: DateTime<Utc>,
}

/// One entry of a user's viewing history
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PdfAccess {
    pub pdf_id: i64,
    pub title: String,
    pub accessed_at: DateTime<Utc>,
}
