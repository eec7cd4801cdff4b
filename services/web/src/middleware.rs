//! Session middleware and permission guard

use auth::{
    AccessError,
    models::Identity,
    token::{cleared_session_cookie, extract_token},
};
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::{error, warn};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Where unauthenticated callers are sent
pub const LOGIN_PATH: &str = "/login";

/// Resolve the caller's identity from its session token
///
/// On success the [`Identity`] is inserted into the request extensions. Any
/// authentication failure clears the session cookie and redirects to the
/// login page; a store failure is an internal error.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match extract_token(req.headers()) {
        Ok(token) => token,
        Err(e) => {
            warn!("Rejected request to {}: {}", req.uri().path(), e);
            return reject_session();
        }
    };

    let session = match state.sessions.validate_session(&token).await {
        Ok(session) => session,
        Err(e) => {
            warn!("Rejected request to {}: {}", req.uri().path(), e);
            return reject_session();
        }
    };

    let identity = match state
        .authorizer
        .resolve_identity_with_roles(session.user_id)
        .await
    {
        Ok(identity) => identity,
        Err(AccessError::UnknownUser(user_id)) => {
            warn!("Session references unknown user {}", user_id);
            state.sessions.destroy_session(&token).await;
            return reject_session();
        }
        Err(e) => {
            error!("Failed to resolve identity for user {}: {}", session.user_id, e);
            return ApiError::Access(e).into_response();
        }
    };

    req.extensions_mut().insert(identity);

    next.run(req).await
}

fn reject_session() -> Response {
    let jar = CookieJar::new().add(cleared_session_cookie());
    (jar, Redirect::to(LOGIN_PATH)).into_response()
}

/// Fail with [`ApiError::Forbidden`] unless the identity holds the permission
pub async fn ensure_permission(
    state: &AppState,
    identity: &Identity,
    permission: &str,
) -> ApiResult<()> {
    if state.authorizer.authorize(Some(identity), permission).await? {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}
