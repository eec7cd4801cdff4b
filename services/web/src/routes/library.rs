//! PDF catalog handlers

use auth::{models::Identity, rbac::permissions};
use axum::{
    Extension, Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    middleware::ensure_permission,
    models::{DeleteForm, EditForm, UploadForm},
    state::AppState,
    validation::validate_upload,
};

/// Directory the stored file paths point into
const UPLOAD_DIR: &str = "uploads";

/// List the catalog, newest first
pub async fn list_pdfs(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<impl IntoResponse> {
    ensure_permission(&state, &identity, permissions::VIEW_PDF).await?;

    let pdfs = state.pdf_repository.list_all().await?;

    Ok(Json(pdfs))
}

/// Show one entry and record the access
pub async fn view_pdf(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    ensure_permission(&state, &identity, permissions::VIEW_PDF).await?;

    let pdf = state
        .pdf_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("PDF".to_string()))?;

    if let Err(e) = state.pdf_repository.record_access(identity.id, pdf.id).await {
        error!("Failed to record access to PDF {} by user {}: {}", pdf.id, identity.id, e);
    }

    Ok(Json(pdf))
}

/// The caller's viewing history
pub async fn history(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<impl IntoResponse> {
    let history = state.pdf_repository.history(identity.id).await?;

    Ok(Json(history))
}

/// Add an entry to the catalog
pub async fn upload_pdf(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<UploadForm>,
) -> ApiResult<impl IntoResponse> {
    ensure_permission(&state, &identity, permissions::UPLOAD_PDF).await?;
    validate_upload(&form.title, &form.filename).map_err(ApiError::BadRequest)?;

    let file_path = format!("{}/{}", UPLOAD_DIR, form.filename);
    let pdf = state
        .pdf_repository
        .create(&form, &file_path, identity.id)
        .await?;
    info!("User {} uploaded PDF {}", identity.username, pdf.id);

    Ok(Redirect::to("/library"))
}

/// Change the metadata of an entry
pub async fn edit_pdf(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<EditForm>,
) -> ApiResult<impl IntoResponse> {
    ensure_permission(&state, &identity, permissions::EDIT_PDF).await?;

    if form.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    let updated = state
        .pdf_repository
        .update(form.id, &form.title, &form.author, &form.description)
        .await?;
    if !updated {
        return Err(ApiError::NotFound("PDF".to_string()));
    }

    Ok(Redirect::to("/library"))
}

/// Remove an entry from the catalog
pub async fn delete_pdf(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<DeleteForm>,
) -> ApiResult<impl IntoResponse> {
    ensure_permission(&state, &identity, permissions::DELETE_PDF).await?;

    if !state.pdf_repository.delete(form.id).await? {
        return Err(ApiError::NotFound("PDF".to_string()));
    }
    info!("User {} deleted PDF {}", identity.username, form.id);

    Ok(Redirect::to("/library"))
}
