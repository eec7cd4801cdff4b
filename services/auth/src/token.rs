//! Session token primitives
//!
//! Token generation, extraction from an inbound request and the cookies used
//! to carry the token to and from browsers.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};

use crate::error::AuthError;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE_NAME: &str = "session_token";

/// Number of random bytes in a session token (256 bits)
const TOKEN_BYTES: usize = 32;

/// Generate a fresh unguessable session token
///
/// Panics if the operating system cannot provide randomness.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Read the session token from a request
///
/// The session cookie wins over the Authorization header. The header must be
/// exactly `Bearer <token>`.
pub fn extract_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        return Ok(cookie.value().to_string());
    }

    let auth_header = match headers.get(AUTHORIZATION) {
        Some(value) => value.to_str().map_err(|_| AuthError::InvalidAuthType)?,
        None => return Err(AuthError::NoAuthHeader),
    };

    if auth_header.is_empty() {
        return Err(AuthError::NoAuthHeader);
    }

    let parts: Vec<&str> = auth_header.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] => Ok((*token).to_string()),
        _ => Err(AuthError::InvalidAuthType),
    }
}

/// Cookie handing a freshly created session to the browser
pub fn session_cookie(token: String, ttl: chrono::Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Immediately-expiring, empty replacement for the session cookie
pub fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .max_age(cookie::time::Duration::ZERO)
        .build()
}
