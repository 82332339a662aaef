use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared_types::{
    AddUserRequest, AdminConfig, AdminStats, HistoryResponse, TimeoutUpdateResponse,
    UpdateTimeoutRequest, UserListResponse, UserMutationResponse,
};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub async fn get_config(State(state): State<AppState>) -> ApiResult<Json<AdminConfig>> {
    Ok(Json(state.admin.get_config().await?))
}

pub async fn update_timeout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<UpdateTimeoutRequest>, JsonRejection>,
) -> ApiResult<Json<TimeoutUpdateResponse>> {
    let Json(request) = payload?;
    let hours = state
        .admin
        .update_timeout(request.timeout_hours, &user.email)
        .await?;

    Ok(Json(TimeoutUpdateResponse {
        success: true,
        timeout_hours: hours,
        message: format!("Timeout updated to {} hours", hours),
    }))
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UserListResponse>> {
    Ok(Json(state.admin.list_users().await?))
}

pub async fn add_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<AddUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserMutationResponse>)> {
    let Json(request) = payload?;
    let email = state.admin.add_user(&request.email, &user.email).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserMutationResponse {
            success: true,
            message: format!("Added {} to allowed users", email),
            email,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct RemoveUserQuery {
    pub email: Option<String>,
}

/// `DELETE /admin/users/:email`
pub async fn remove_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(email): Path<String>,
) -> ApiResult<Json<UserMutationResponse>> {
    remove(&state, &email, &user.email).await
}

/// `DELETE /admin/users?email=`
pub async fn remove_user_by_query(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<RemoveUserQuery>,
) -> ApiResult<Json<UserMutationResponse>> {
    let email = query
        .email
        .ok_or_else(|| ApiError::bad_request("Email parameter is required"))?;
    remove(&state, &email, &user.email).await
}

async fn remove(
    state: &AppState,
    email: &str,
    actor: &str,
) -> ApiResult<Json<UserMutationResponse>> {
    let email = state.admin.remove_user(email, actor).await?;

    Ok(Json(UserMutationResponse {
        success: true,
        message: format!("Removed {} from allowed users", email),
        email,
    }))
}

pub async fn get_history(State(state): State<AppState>) -> ApiResult<Json<HistoryResponse>> {
    Ok(Json(state.admin.history().await?))
}

pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<AdminStats>> {
    Ok(Json(state.admin.stats().await?))
}
