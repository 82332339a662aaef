use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use shared_types::{ApiStatusResponse, HealthResponse};

use crate::AppState;

pub const SERVICE_NAME: &str = "watered";

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

pub async fn api_status(State(state): State<AppState>) -> Json<ApiStatusResponse> {
    let now = Utc::now();
    let uptime = now - state.started_at;

    Json(ApiStatusResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime_seconds: uptime.num_milliseconds() as f64 / 1000.0,
        uptime_formatted: format_uptime(uptime),
    })
}

/// Coarsest whole unit of an uptime; anything under two minutes reads "1 minute".
pub fn format_uptime(uptime: Duration) -> String {
    let unit = |count: i64, name: &str| {
        if count == 1 {
            format!("1 {}", name)
        } else {
            format!("{} {}s", count, name)
        }
    };

    if uptime.num_days() >= 1 {
        unit(uptime.num_days(), "day")
    } else if uptime.num_hours() >= 1 {
        unit(uptime.num_hours(), "hour")
    } else {
        unit(uptime.num_minutes().max(1), "minute")
    }
}
