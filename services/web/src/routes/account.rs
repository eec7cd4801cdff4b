//! Registration, login and logout

use auth::{
    AccessError,
    models::NewUser,
    token::{cleared_session_cookie, extract_token, session_cookie},
};
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use common::error::DatabaseError;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    models::{LoginForm, RegisterForm},
    routes::redirect,
    state::AppState,
    validation::{validate_email, validate_password, validate_username},
};

/// Create an account holding the baseline role and sign it in
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> ApiResult<Response> {
    validate_username(&form.username).map_err(ApiError::BadRequest)?;
    validate_email(&form.email).map_err(ApiError::BadRequest)?;
    validate_password(&form.password, &form.confirm_password).map_err(ApiError::BadRequest)?;

    let new_user = NewUser {
        username: form.username,
        email: form.email,
        password: form.password,
    };

    let user = state
        .authorizer
        .register_identity(&new_user)
        .await
        .map_err(|e| match e {
            AccessError::Storage(DatabaseError::UniqueViolation(_)) => {
                warn!("Registration rejected for taken username or email: {}", new_user.username);
                ApiError::BadRequest("Username or email already taken".to_string())
            }
            other => ApiError::Access(other),
        })?;

    let token = state.sessions.create_session(user.id, &user.username).await;
    let jar = jar.add(session_cookie(token, state.sessions.config().ttl()));

    Ok(redirect(&headers, jar, "/library"))
}

/// Verify credentials and start a session
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let user = state
        .authorizer
        .authenticate(&form.username, &form.password)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid username or password".to_string()))?;

    let token = state.sessions.create_session(user.id, &user.username).await;
    info!("User {} logged in", user.username);
    let jar = jar.add(session_cookie(token, state.sessions.config().ttl()));

    Ok(redirect(&headers, jar, "/library"))
}

/// End the caller's session, if any, and clear the cookie
pub async fn logout(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> Response {
    if let Ok(token) = extract_token(&headers) {
        state.sessions.destroy_session(&token).await;
    }

    (jar.add(cleared_session_cookie()), Redirect::to("/")).into_response()
}
