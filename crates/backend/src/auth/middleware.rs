//! Route guards, session extractors and cookie helpers.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::error::ApiError;
use crate::AppState;

use super::types::SessionUser;

/// Requires a session; otherwise redirects to the login page.
///
/// For browser-facing pages. Use with `axum::middleware::from_fn_with_state`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match state.auth.session_from_headers(request.headers()) {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => Redirect::to("/login").into_response(),
    }
}

/// Requires a session whose email is still on the allowlist; JSON errors.
pub async fn require_api_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(user) = state.auth.session_from_headers(request.headers()) else {
        return ApiError::unauthorized("Authentication required").into_response();
    };

    // Verify email is still allowed
    if !state.auth.is_user_allowed(&user.email).await {
        return ApiError::forbidden("Email not authorized").into_response();
    }

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Requires a session belonging to a current admin.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let user = match request.extensions().get::<SessionUser>() {
        Some(user) => user.clone(),
        None => match state.auth.session_from_headers(request.headers()) {
            Some(user) => user,
            None => return ApiError::unauthorized("Authentication required").into_response(),
        },
    };

    if !state.auth.is_user_admin(&user.email).await {
        tracing::warn!("Admin access denied for {}", user.email);
        return ApiError::forbidden("Admin access required").into_response();
    }

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// The signed-in user; rejects with 401 when there is no valid session.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<SessionUser>() {
            return Ok(CurrentUser(user.clone()));
        }
        state
            .auth
            .session_from_headers(&parts.headers)
            .map(CurrentUser)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// The signed-in user, if any.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<SessionUser>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<SessionUser>() {
            return Ok(OptionalUser(Some(user.clone())));
        }
        Ok(OptionalUser(state.auth.session_from_headers(&parts.headers)))
    }
}

pub fn extract_token_from_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(cookie_header) = value.to_str() else {
            continue;
        };
        for cookie_str in cookie_header.split(';') {
            if let Ok(cookie) = cookie::Cookie::parse(cookie_str.trim()) {
                if cookie.name() == cookie_name && !cookie.value().is_empty() {
                    return Some(cookie.value().to_string());
                }
            }
        }
    }

    None
}

/// Build an auth cookie string.
pub fn build_auth_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        name, value, max_age_secs, secure
    )
}

pub fn clear_auth_cookie(name: &str, secure: bool) -> String {
    build_auth_cookie(name, "", 0, secure)
}
