//! Authentication HTTP handlers.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

use super::middleware::OptionalUser;
use super::types::{AuthError, AuthStatusResponse, AuthUserResponse, DemoLoginRequest};

/// Start the login flow.
///
/// Sends the browser to the identity provider, or to the login page in demo mode.
pub async fn auth_login(State(state): State<AppState>) -> ApiResult<Response> {
    let Some(login) = state.auth.begin_login()? else {
        return Ok(Redirect::temporary("/login").into_response());
    };

    Ok((
        StatusCode::TEMPORARY_REDIRECT,
        [
            (header::LOCATION, login.url.as_str()),
            (header::SET_COOKIE, login.state_cookie.as_str()),
        ],
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct AuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Handle the provider callback.
///
/// The state cookie is single use and cleared whatever the outcome.
pub async fn auth_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AuthCallbackParams>,
) -> Response {
    let clear_state = state.auth.clear_state();

    let result = handle_callback_inner(&state, &headers, params).await;
    let mut response = match result {
        Ok(session_cookie) => (
            StatusCode::SEE_OTHER,
            [
                (header::LOCATION, "/"),
                (header::SET_COOKIE, session_cookie.as_str()),
            ],
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    };

    if let Ok(value) = clear_state.parse() {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

async fn handle_callback_inner(
    state: &AppState,
    headers: &HeaderMap,
    params: AuthCallbackParams,
) -> Result<String, AuthError> {
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or(AuthError::MissingCode)?;

    state.auth.verify_state(headers, params.state.as_deref())?;

    let identity = state.auth.handle_callback(&code).await?;
    tracing::info!("OAuth login attempt from: {}", identity.email);

    if !state.auth.is_user_allowed(&identity.email).await {
        tracing::warn!("Unauthorized login attempt from: {}", identity.email);
        return Err(AuthError::NotAllowed(identity.email));
    }

    let cookie = state.auth.create_session(&identity).await?;
    tracing::info!("Successful login for: {} ({})", identity.name, identity.email);
    Ok(cookie)
}

/// Logout - clear the session cookie.
pub async fn auth_logout(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> impl IntoResponse {
    if let Some(user) = user {
        tracing::info!("User {} logged out", user.email);
    }

    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/login".to_string()),
            (header::SET_COOKIE, state.auth.clear_session()),
        ],
    )
}

/// Current authentication status.
pub async fn auth_status(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        authenticated: user.is_some(),
        demo_mode: state.auth.is_demo(),
        user: user.as_ref().map(AuthUserResponse::from),
    })
}

/// Demo login via query string.
pub async fn demo_login_get(
    State(state): State<AppState>,
    Query(params): Query<DemoLoginRequest>,
) -> ApiResult<Response> {
    demo_login(&state, params).await
}

/// Demo login via JSON body.
pub async fn demo_login_post(
    State(state): State<AppState>,
    payload: Result<Json<DemoLoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;
    demo_login(&state, request).await
}

async fn demo_login(state: &AppState, request: DemoLoginRequest) -> ApiResult<Response> {
    let email = request.email.unwrap_or_default();
    let cookie = state
        .auth
        .demo_login(&email, request.name.as_deref())
        .await?;

    Ok((
        StatusCode::SEE_OTHER,
        [(header::LOCATION, "/"), (header::SET_COOKIE, cookie.as_str())],
    )
        .into_response())
}
