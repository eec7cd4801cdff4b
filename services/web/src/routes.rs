//! Library service routes

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use serde_json::json;

use auth::token::extract_token;

use crate::{middleware::require_session, state::AppState};

pub mod account;
pub mod admin;
pub mod library;

/// Create the router for the library service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/library", get(library::list_pdfs))
        .route("/library/view/:id", get(library::view_pdf))
        .route("/library/history", get(library::history))
        .route("/library/upload", post(library::upload_pdf))
        .route("/library/edit", post(library::edit_pdf))
        .route("/library/delete", post(library::delete_pdf))
        .route("/admin", get(admin::dashboard))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/assign-role", post(admin::assign_role))
        .route("/admin/remove-role", post(admin::remove_role))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(index))
        .route("/login", get(login_page))
        .route("/auth/register", post(account::register))
        .route("/auth/login", post(account::login))
        .route("/auth/logout", get(account::logout).post(account::logout))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "library"
    }))
}

/// Landing page; callers with a live session go straight to the library
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Ok(token) = extract_token(&headers) {
        if state.sessions.validate_session(&token).await.is_ok() {
            return Redirect::to("/library").into_response();
        }
    }

    Json(json!({
        "service": "library",
        "login": "/auth/login",
        "register": "/auth/register"
    }))
    .into_response()
}

/// Target of authentication redirects
pub async fn login_page() -> impl IntoResponse {
    Json(json!({
        "message": "Authentication required",
        "login": "/auth/login"
    }))
}

/// Redirect after a state change, honouring htmx requests
///
/// htmx follows redirects transparently, so it is told where to go with an
/// `HX-Redirect` header on a plain 200 instead.
pub(crate) fn redirect(headers: &HeaderMap, jar: CookieJar, to: &'static str) -> Response {
    let is_htmx = headers
        .get("HX-Request")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "true");

    if is_htmx {
        (jar, [("HX-Redirect", to)]).into_response()
    } else {
        (jar, Redirect::to(to)).into_response()
    }
}
