//! Browser pages served from the frontend directory.

use std::convert::Infallible;
use std::path::Path;

use axum::{
    body::Body,
    extract::{Request, State},
    response::{IntoResponse, Redirect, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::auth::OptionalUser;
use crate::AppState;

/// Sign-in page; signed-in users go straight home.
pub async fn login_page(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    request: Request,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    serve_page(&state.frontend_dir, "login.html", request).await
}

/// Admin dashboard; guarded by `require_auth` and `require_admin`.
pub async fn admin_page(State(state): State<AppState>, request: Request) -> Response {
    serve_page(&state.frontend_dir, "admin.html", request).await
}

async fn serve_page(dir: &str, file: &str, request: Request) -> Response {
    let result: Result<_, Infallible> = ServeFile::new(Path::new(dir).join(file))
        .oneshot(request)
        .await;
    match result {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}
