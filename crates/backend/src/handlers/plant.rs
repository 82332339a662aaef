use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use shared_types::{
    PlantActionResponse, PlantResponse, PlantStatusResponse, PlantTimerResponse,
    UpdatePlantSettingsRequest,
};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::AppState;

pub async fn get_plant(State(state): State<AppState>) -> ApiResult<Json<PlantResponse>> {
    let plant = state.plants.get_plant().await?;
    Ok(Json(PlantResponse::from(&plant)))
}

/// Records a watering by the signed-in user.
pub async fn water_plant(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<PlantActionResponse>> {
    let plant = state.plants.water(&user.email).await?;

    Ok(Json(PlantActionResponse {
        success: true,
        message: "Plant watered successfully! 🌱".to_string(),
        plant: PlantResponse::from(&plant),
    }))
}

pub async fn get_status(State(state): State<AppState>) -> ApiResult<Json<PlantStatusResponse>> {
    Ok(Json(state.plants.get_status().await?))
}

pub async fn get_timer(State(state): State<AppState>) -> ApiResult<Json<PlantTimerResponse>> {
    Ok(Json(state.plants.get_timer().await?))
}

pub async fn update_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<UpdatePlantSettingsRequest>, JsonRejection>,
) -> ApiResult<Json<PlantActionResponse>> {
    let Json(request) = payload?;
    let plant = state
        .admin
        .update_plant_settings(request.into_update(), &user.email)
        .await?;

    Ok(Json(PlantActionResponse {
        success: true,
        message: "Plant settings updated successfully".to_string(),
        plant: PlantResponse::from(&plant),
    }))
}

pub async fn reset_plant(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<PlantActionResponse>> {
    let plant = state.plants.reset().await?;
    tracing::info!("Plant reset by {}", user.email);

    Ok(Json(PlantActionResponse {
        success: true,
        message: "Plant reset to unwatered state".to_string(),
        plant: PlantResponse::from(&plant),
    }))
}
