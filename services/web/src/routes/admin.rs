//! User and role administration

use auth::{AccessError, models::Identity, rbac::permissions};
use axum::{
    Extension, Form, Json,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde_json::json;

use crate::{
    error::{ApiError, ApiResult},
    middleware::ensure_permission,
    models::RoleChangeForm,
    state::AppState,
};

/// Users with their roles and every role with its permissions
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<impl IntoResponse> {
    ensure_permission(&state, &identity, permissions::MANAGE_ROLES).await?;

    let users = state.authorizer.list_identities().await?;
    let roles = state.authorizer.list_roles().await?;

    Ok(Json(json!({
        "users": users,
        "roles": roles,
    })))
}

/// Users with their roles
pub async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<impl IntoResponse> {
    ensure_permission(&state, &identity, permissions::MANAGE_USERS).await?;

    let users = state.authorizer.list_identities().await?;

    Ok(Json(users))
}

/// Grant a role, recording the caller as the granter
pub async fn assign_role(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<RoleChangeForm>,
) -> ApiResult<impl IntoResponse> {
    ensure_permission(&state, &identity, permissions::MANAGE_ROLES).await?;

    match state.authorizer.resolve_identity_with_roles(form.user_id).await {
        Ok(_) => {}
        Err(AccessError::UnknownUser(_)) => return Err(ApiError::NotFound("User".to_string())),
        Err(e) => return Err(e.into()),
    }
    if state.authorizer.find_role_by_id(form.role_id).await?.is_none() {
        return Err(ApiError::NotFound("Role".to_string()));
    }

    state
        .authorizer
        .assign_role(form.user_id, form.role_id, Some(identity.id))
        .await?;

    Ok(Redirect::to("/admin"))
}

/// Revoke a role; revoking one the user does not hold is not an error
pub async fn remove_role(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<RoleChangeForm>,
) -> ApiResult<impl IntoResponse> {
    ensure_permission(&state, &identity, permissions::MANAGE_ROLES).await?;

    state
        .authorizer
        .remove_role(form.user_id, form.role_id)
        .await?;

    Ok(Redirect::to("/admin"))
}
