//! Request and response bodies for the HTTP API.
//!
//! Durations are carried as whole seconds.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::plant::{HealthStatus, Plant, PlantSettingsUpdate};

fn seconds(duration: Option<Duration>) -> Option<i64> {
    duration.map(|d| d.num_seconds())
}

// ============================================================================
// Plant
// ============================================================================

/// Plant record plus everything derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantResponse {
    pub id: i64,
    pub name: String,
    pub last_watered: Option<DateTime<Utc>>,
    pub timeout_hours: i64,
    pub watered_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub health_status: HealthStatus,
    pub time_since_watering: String,
    pub hours_since_watering: Option<f64>,
    pub is_overdue: bool,
    pub time_until_due: Option<i64>,
}

impl PlantResponse {
    pub fn from_plant_at(plant: &Plant, now: DateTime<Utc>) -> Self {
        PlantResponse {
            id: plant.id,
            name: plant.name.clone(),
            last_watered: plant.last_watered,
            timeout_hours: plant.timeout_hours,
            watered_by: plant.watered_by.clone(),
            created_at: plant.created_at,
            updated_at: plant.updated_at,
            health_status: plant.health_status_at(now),
            time_since_watering: plant.formatted_time_since_watering_at(now),
            hours_since_watering: plant.hours_since_watering_at(now),
            is_overdue: plant.is_overdue_at(now),
            time_until_due: seconds(plant.time_until_due_at(now)),
        }
    }
}

impl From<&Plant> for PlantResponse {
    fn from(plant: &Plant) -> Self {
        PlantResponse::from_plant_at(plant, Utc::now())
    }
}

/// Envelope returned by the mutating plant endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantActionResponse {
    pub success: bool,
    pub message: String,
    pub plant: PlantResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantStatusResponse {
    pub status: HealthStatus,
    pub time_since_watering_formatted: String,
    pub hours_since_watering: Option<f64>,
    pub is_overdue: bool,
    pub time_until_due: Option<i64>,
}

impl PlantStatusResponse {
    pub fn from_plant_at(plant: &Plant, now: DateTime<Utc>) -> Self {
        PlantStatusResponse {
            status: plant.health_status_at(now),
            time_since_watering_formatted: plant.formatted_time_since_watering_at(now),
            hours_since_watering: plant.hours_since_watering_at(now),
            is_overdue: plant.is_overdue_at(now),
            time_until_due: seconds(plant.time_until_due_at(now)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantTimerResponse {
    pub last_watered: Option<DateTime<Utc>>,
    pub time_since_watering: Option<i64>,
    pub time_since_watering_formatted: String,
    pub hours_since_watering: Option<f64>,
    pub timeout_hours: i64,
    pub next_watering_time: Option<DateTime<Utc>>,
    pub time_until_due: Option<i64>,
    pub is_overdue: bool,
}

impl PlantTimerResponse {
    pub fn from_plant_at(plant: &Plant, now: DateTime<Utc>) -> Self {
        PlantTimerResponse {
            last_watered: plant.last_watered,
            time_since_watering: seconds(plant.time_since_watering_at(now)),
            time_since_watering_formatted: plant.formatted_time_since_watering_at(now),
            hours_since_watering: plant.hours_since_watering_at(now),
            timeout_hours: plant.timeout_hours,
            next_watering_time: plant.next_watering_time(),
            time_until_due: seconds(plant.time_until_due_at(now)),
            is_overdue: plant.is_overdue_at(now),
        }
    }
}

/// Body of `PUT /api/plant/settings`. Absent, empty or zero fields are
/// left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlantSettingsRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub timeout_hours: Option<i64>,
}

impl UpdatePlantSettingsRequest {
    pub fn into_update(self) -> PlantSettingsUpdate {
        PlantSettingsUpdate::from_sentinels(
            self.name.as_deref().unwrap_or(""),
            self.timeout_hours.unwrap_or(0),
        )
    }
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUserResponse {
    pub email: String,
    pub name: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub demo_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUserResponse>,
}

/// Query string or JSON body accepted by `/auth/demo-login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemoLoginRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTimeoutRequest {
    #[serde(rename = "timeoutHours")]
    pub timeout_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutUpdateResponse {
    pub success: bool,
    pub timeout_hours: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddUserRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMutationResponse {
    pub success: bool,
    pub message: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub allowed_emails: Vec<String>,
    pub admin_emails: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub current_state: Option<Plant>,
    pub events: Vec<serde_json::Value>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: usize,
    pub admin_users: usize,
    pub registered_users: usize,
    pub timeout_hours: i64,
    pub plant_watered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_watered: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watered_by: Option<String>,
    pub system_status: String,
}

// ============================================================================
// System
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStatusResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: f64,
    pub uptime_formatted: String,
}
