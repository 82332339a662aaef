//! The tracked plant and the watering state derived from it.
//!
//! Every derivation has a clock-injected `*_at(now)` form; the plain
//! variants read `Utc::now()`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name given to the plant when it is first created.
pub const DEFAULT_PLANT_NAME: &str = "Our Plant";

/// Watering interval given to the plant when it is first created.
pub const DEFAULT_TIMEOUT_HOURS: i64 = 24;

/// Upper bound on a plant's watering interval (one year).
pub const MAX_TIMEOUT_HOURS: i64 = 8760;

/// Identifier of the one plant this system tracks.
pub const PLANT_ID: i64 = 1;

/// Three-bucket health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    NeedsWater,
    Critical,
}

impl HealthStatus {
    pub fn as_str(&self) -> &str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::NeedsWater => "needs_water",
            HealthStatus::Critical => "critical",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A plant field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name: plant name cannot be empty")]
    EmptyName,

    #[error("timeout_hours: must be between 1 and {max}, got {value}")]
    TimeoutOutOfRange { value: i64, max: i64 },

    #[error("timeout_hours: cannot be negative")]
    NegativeTimeout,
}

impl ValidationError {
    /// The offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyName => "name",
            ValidationError::TimeoutOutOfRange { .. } | ValidationError::NegativeTimeout => {
                "timeout_hours"
            }
        }
    }
}

/// Plant record, as held by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: i64,
    pub name: String,
    pub last_watered: Option<DateTime<Utc>>,
    pub timeout_hours: i64,
    /// Email of whoever last watered the plant; empty when never watered.
    pub watered_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plant {
    /// A freshly created plant that has never been watered.
    pub fn new_default(now: DateTime<Utc>) -> Self {
        Plant {
            id: PLANT_ID,
            name: DEFAULT_PLANT_NAME.to_string(),
            last_watered: None,
            timeout_hours: DEFAULT_TIMEOUT_HOURS,
            watered_by: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn timeout(&self) -> Duration {
        Duration::hours(self.timeout_hours)
    }

    pub fn time_since_watering_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_watered.map(|watered| now - watered)
    }

    pub fn time_since_watering(&self) -> Option<Duration> {
        self.time_since_watering_at(Utc::now())
    }

    pub fn hours_since_watering_at(&self, now: DateTime<Utc>) -> Option<f64> {
        self.time_since_watering_at(now)
            .map(|elapsed| elapsed.num_milliseconds() as f64 / 3_600_000.0)
    }

    pub fn hours_since_watering(&self) -> Option<f64> {
        self.hours_since_watering_at(Utc::now())
    }

    pub fn health_status_at(&self, now: DateTime<Utc>) -> HealthStatus {
        let Some(hours) = self.hours_since_watering_at(now) else {
            return HealthStatus::Critical;
        };
        let timeout = self.timeout_hours as f64;

        if hours < timeout * 0.5 {
            HealthStatus::Healthy
        } else if hours < timeout {
            HealthStatus::NeedsWater
        } else {
            HealthStatus::Critical
        }
    }

    pub fn health_status(&self) -> HealthStatus {
        self.health_status_at(Utc::now())
    }

    /// Overdue at exactly `timeout_hours` after the last watering.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.time_since_watering_at(now) {
            Some(elapsed) => elapsed >= self.timeout(),
            None => true,
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Utc::now())
    }

    /// When the plant becomes overdue; `None` if never watered.
    pub fn next_watering_time(&self) -> Option<DateTime<Utc>> {
        self.last_watered.map(|watered| watered + self.timeout())
    }

    /// Negative once the plant is overdue.
    pub fn time_until_due_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.next_watering_time().map(|due| due - now)
    }

    pub fn time_until_due(&self) -> Option<Duration> {
        self.time_until_due_at(Utc::now())
    }

    pub fn formatted_time_since_watering_at(&self, now: DateTime<Utc>) -> String {
        match self.time_since_watering_at(now) {
            Some(elapsed) => format_elapsed(elapsed),
            None => "Never watered".to_string(),
        }
    }

    pub fn formatted_time_since_watering(&self) -> String {
        self.formatted_time_since_watering_at(Utc::now())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.timeout_hours <= 0 || self.timeout_hours > MAX_TIMEOUT_HOURS {
            return Err(ValidationError::TimeoutOutOfRange {
                value: self.timeout_hours,
                max: MAX_TIMEOUT_HOURS,
            });
        }
        Ok(())
    }

    pub fn water(&mut self, actor: &str, now: DateTime<Utc>) {
        self.last_watered = Some(now);
        self.watered_by = actor.to_string();
        self.updated_at = now;
    }

    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.last_watered = None;
        self.watered_by.clear();
        self.updated_at = now;
    }

    /// Applies a partial settings update, then validates the result.
    ///
    /// The plant is left untouched when the update is rejected.
    pub fn apply_settings(
        &mut self,
        update: &PlantSettingsUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let mut candidate = self.clone();

        if let Some(name) = &update.name {
            candidate.name = name.clone();
        }
        if let Some(timeout_hours) = update.timeout_hours {
            if timeout_hours < 0 {
                return Err(ValidationError::NegativeTimeout);
            }
            candidate.timeout_hours = timeout_hours;
        }

        candidate.validate()?;
        candidate.updated_at = now;
        *self = candidate;
        Ok(())
    }
}

/// "N minute(s) ago" below an hour, "N hour(s) ago" below a day, else days.
/// Counts are truncated, never rounded. Negative spans read as "0 minutes ago".
pub fn format_elapsed(elapsed: Duration) -> String {
    let elapsed = elapsed.max(Duration::zero());
    if elapsed < Duration::hours(1) {
        plural(elapsed.num_minutes(), "minute")
    } else if elapsed < Duration::hours(24) {
        plural(elapsed.num_hours(), "hour")
    } else {
        plural(elapsed.num_days(), "day")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// Partial update of the plant's settings. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantSettingsUpdate {
    pub name: Option<String>,
    pub timeout_hours: Option<i64>,
}

impl PlantSettingsUpdate {
    /// Maps the empty-name / zero-timeout wire convention onto `None`.
    pub fn from_sentinels(name: &str, timeout_hours: i64) -> Self {
        PlantSettingsUpdate {
            name: (!name.is_empty()).then(|| name.to_string()),
            timeout_hours: (timeout_hours != 0).then_some(timeout_hours),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.timeout_hours.is_none()
    }
}
