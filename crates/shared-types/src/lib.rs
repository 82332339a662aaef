//! Records, plant watering logic and wire types shared by the server and
//! the command-line client.

pub mod api;
pub mod plant;
pub mod user;

pub use api::*;
pub use plant::{
    format_elapsed, HealthStatus, Plant, PlantSettingsUpdate, ValidationError,
    DEFAULT_PLANT_NAME, DEFAULT_TIMEOUT_HOURS, MAX_TIMEOUT_HOURS, PLANT_ID,
};
pub use user::{
    is_plausible_email, normalize_email, AdminConfig, User, MAX_ADMIN_TIMEOUT_HOURS,
    MIN_ADMIN_TIMEOUT_HOURS,
};
