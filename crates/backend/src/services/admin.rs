//! Allowlist and watering-timeout administration.

use std::sync::Arc;

use chrono::Utc;
use shared_types::{
    is_plausible_email, normalize_email, AdminConfig, AdminStats, HistoryResponse, Plant,
    PlantSettingsUpdate, UserListResponse, DEFAULT_TIMEOUT_HOURS, MAX_ADMIN_TIMEOUT_HOURS,
    MIN_ADMIN_TIMEOUT_HOURS,
};

use super::{PlantService, ServiceError, ServiceResult, StorageContext, WriteLock};
use crate::storage::Storage;

const DEMO_ALLOWED_EMAILS: [&str; 4] = [
    "demo@example.com",
    "user1@example.com",
    "user2@example.com",
    "test@example.com",
];
const DEMO_ADMIN_EMAILS: [&str; 1] = ["admin@example.com"];

/// Allowlist taken from the environment at startup.
///
/// Seeds the stored [`AdminConfig`] the first time it is read, and is
/// consulted directly only when storage cannot be reached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticAllowlist {
    allowed: Vec<String>,
    admins: Vec<String>,
}

impl StaticAllowlist {
    /// Admins are folded into the allowed list.
    pub fn new(allowed: &[String], admins: &[String]) -> Self {
        let seeded = AdminConfig::seeded(DEFAULT_TIMEOUT_HOURS, allowed, admins);
        Self {
            allowed: seeded.allowed_emails,
            admins: seeded.admin_emails,
        }
    }

    /// Uses the demo accounts when neither list is configured.
    pub fn from_lists_or_demo(allowed: Vec<String>, admins: Vec<String>) -> Self {
        if allowed.is_empty() && admins.is_empty() {
            let allowed: Vec<String> = DEMO_ALLOWED_EMAILS.iter().map(|s| s.to_string()).collect();
            let admins: Vec<String> = DEMO_ADMIN_EMAILS.iter().map(|s| s.to_string()).collect();
            return Self::new(&allowed, &admins);
        }
        Self::new(&allowed, &admins)
    }

    pub fn is_allowed(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.allowed.contains(&email)
    }

    pub fn is_admin(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.admins.contains(&email)
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    fn to_config(&self, timeout_hours: i64) -> AdminConfig {
        AdminConfig::seeded(timeout_hours, &self.allowed, &self.admins)
    }
}

/// Service for admin-config business logic
#[derive(Clone)]
pub struct AdminService {
    storage: Arc<dyn Storage>,
    plants: PlantService,
    seed: StaticAllowlist,
    write_lock: WriteLock,
}

impl AdminService {
    pub fn new(
        storage: Arc<dyn Storage>,
        plants: PlantService,
        seed: StaticAllowlist,
        write_lock: WriteLock,
    ) -> Self {
        Self {
            storage,
            plants,
            seed,
            write_lock,
        }
    }

    pub fn seed(&self) -> &StaticAllowlist {
        &self.seed
    }

    /// Stored config, materialised from the seed on first access.
    pub async fn get_config(&self) -> ServiceResult<AdminConfig> {
        if let Some(config) = self
            .storage
            .get_admin_config()
            .await
            .context("Failed to get admin config")?
        {
            return Ok(config);
        }

        let _guard = self.write_lock.lock().await;
        self.load_or_create().await
    }

    /// Caller must hold the write lock.
    ///
    /// A new config takes its timeout from the plant when one already exists.
    async fn load_or_create(&self) -> ServiceResult<AdminConfig> {
        if let Some(config) = self
            .storage
            .get_admin_config()
            .await
            .context("Failed to get admin config")?
        {
            return Ok(config);
        }

        let timeout_hours = self
            .storage
            .get_plant()
            .await
            .context("Failed to get plant state")?
            .map_or(DEFAULT_TIMEOUT_HOURS, |plant| plant.timeout_hours);
        let config = self.seed.to_config(timeout_hours);
        self.storage
            .put_admin_config(config.clone())
            .await
            .context("Failed to create default config")?;

        tracing::info!(
            "Created admin config with {} allowed and {} admin emails",
            config.allowed_emails.len(),
            config.admin_emails.len()
        );
        Ok(config)
    }

    /// Sets the watering timeout on both the config and the plant.
    pub async fn update_timeout(&self, hours: i64, actor: &str) -> ServiceResult<i64> {
        if !(MIN_ADMIN_TIMEOUT_HOURS..=MAX_ADMIN_TIMEOUT_HOURS).contains(&hours) {
            return Err(ServiceError::Validation(format!(
                "Timeout must be between {} and {} hours",
                MIN_ADMIN_TIMEOUT_HOURS, MAX_ADMIN_TIMEOUT_HOURS
            )));
        }

        let _guard = self.write_lock.lock().await;
        let now = Utc::now();

        let mut config = self.load_or_create().await?;
        config.timeout_hours = hours;
        config.touch(actor, now);

        let previous = self.plants.load_or_create().await?;
        let mut plant = previous.clone();
        plant.timeout_hours = hours;
        plant.updated_at = now;

        self.save_plant_then_config(previous, plant, Some(config), "Failed to update plant timeout")
            .await?;

        tracing::info!("Timeout updated to {} hours by {}", hours, actor);
        Ok(hours)
    }

    /// Partial update of the plant's name and timeout.
    ///
    /// A timeout change is mirrored into the config. Nothing is written when
    /// the update is empty or fails validation.
    pub async fn update_plant_settings(
        &self,
        update: PlantSettingsUpdate,
        actor: &str,
    ) -> ServiceResult<Plant> {
        let _guard = self.write_lock.lock().await;
        let previous = self.plants.load_or_create().await?;
        if update.is_empty() {
            return Ok(previous);
        }

        let now = Utc::now();
        let mut plant = previous.clone();
        plant.apply_settings(&update, now)?;

        let config = if update.timeout_hours.is_some() {
            let mut config = self.load_or_create().await?;
            if config.timeout_hours == plant.timeout_hours {
                None
            } else {
                config.timeout_hours = plant.timeout_hours;
                config.touch(actor, now);
                Some(config)
            }
        } else {
            None
        };

        self.save_plant_then_config(previous, plant.clone(), config, "Failed to save plant settings")
            .await?;

        tracing::info!(
            "Plant settings updated by {}: name={}, timeout={} hours",
            actor,
            plant.name,
            plant.timeout_hours
        );
        Ok(plant)
    }

    /// Writes the plant, then the config. When the config write fails the
    /// previous plant is written back.
    async fn save_plant_then_config(
        &self,
        previous: Plant,
        plant: Plant,
        config: Option<AdminConfig>,
        context: &str,
    ) -> ServiceResult<()> {
        self.storage.put_plant(plant).await.context(context)?;

        let Some(config) = config else {
            return Ok(());
        };
        if let Err(source) = self.storage.put_admin_config(config).await {
            if let Err(e) = self.storage.put_plant(previous).await {
                tracing::error!("Failed to restore plant after config write failed: {}", e);
            }
            return Err(ServiceError::Storage {
                context: "Failed to update config".to_string(),
                source,
            });
        }
        Ok(())
    }

    pub async fn list_users(&self) -> ServiceResult<UserListResponse> {
        let config = self.get_config().await?;
        Ok(UserListResponse {
            allowed_emails: config.allowed_emails,
            admin_emails: config.admin_emails,
        })
    }

    /// Returns the normalised email that was added.
    pub async fn add_user(&self, email: &str, actor: &str) -> ServiceResult<String> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ServiceError::Validation("Email is required".to_string()));
        }
        if !is_plausible_email(&email) {
            return Err(ServiceError::Validation("Invalid email format".to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let mut config = self.load_or_create().await?;

        if config.allowed_emails.contains(&email) {
            return Err(ServiceError::Conflict(
                "Email already exists in whitelist".to_string(),
            ));
        }

        config.allowed_emails.push(email.clone());
        config.touch(actor, Utc::now());
        self.storage
            .put_admin_config(config)
            .await
            .context("Failed to update config")?;

        tracing::info!("{} added {} to allowed users", actor, email);
        Ok(email)
    }

    /// Removes the email from the allowlist and from the admin list.
    pub async fn remove_user(&self, email: &str, actor: &str) -> ServiceResult<String> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ServiceError::Validation(
                "Email parameter is required".to_string(),
            ));
        }

        let _guard = self.write_lock.lock().await;
        let mut config = self.load_or_create().await?;

        let before = config.allowed_emails.len();
        config.allowed_emails.retain(|e| *e != email);
        if config.allowed_emails.len() == before {
            return Err(ServiceError::NotFound(
                "Email not found in whitelist".to_string(),
            ));
        }
        config.admin_emails.retain(|e| *e != email);

        config.touch(actor, Utc::now());
        self.storage
            .put_admin_config(config)
            .await
            .context("Failed to update config")?;

        tracing::info!("{} removed {} from allowed users", actor, email);
        Ok(email)
    }

    pub async fn history(&self) -> ServiceResult<HistoryResponse> {
        let plant = self
            .storage
            .get_plant()
            .await
            .context("Failed to get plant state")?;

        Ok(HistoryResponse {
            current_state: plant,
            events: Vec::new(),
            message: "Only the latest watering is recorded".to_string(),
        })
    }

    pub async fn stats(&self) -> ServiceResult<AdminStats> {
        let config = self.get_config().await?;
        let plant = self
            .storage
            .get_plant()
            .await
            .context("Failed to get plant state")?;
        let registered_users = self
            .storage
            .list_users()
            .await
            .context("Failed to list users")?
            .len();

        let watered = plant.filter(|p| p.last_watered.is_some());

        Ok(AdminStats {
            total_users: config.allowed_emails.len(),
            admin_users: config.admin_emails.len(),
            registered_users,
            timeout_hours: config.timeout_hours,
            plant_watered: watered.is_some(),
            last_watered: watered.as_ref().and_then(|p| p.last_watered),
            watered_by: watered.map(|p| p.watered_by),
            system_status: "healthy".to_string(),
        })
    }
}
