//! HTTP service tracking when the shared household plant was last watered.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod storage;

use auth::{AuthConfig, AuthService, GoogleProvider, IdentityProvider};
use config::AppConfig;
use services::{new_write_lock, AdminService, PlantService, StaticAllowlist};
use storage::{JsonFileStorage, MemoryStorage, Storage};

pub use routes::build_router;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub plants: PlantService,
    pub admin: AdminService,
    pub auth: AuthService,
    pub frontend_dir: String,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wires the services over one storage backend and one write lock.
    pub fn new(
        storage: Arc<dyn Storage>,
        seed: StaticAllowlist,
        auth_config: AuthConfig,
        provider: Option<Arc<dyn IdentityProvider>>,
        frontend_dir: impl Into<String>,
    ) -> Self {
        let write_lock = new_write_lock();
        let plants = PlantService::new(storage.clone(), write_lock.clone());
        let admin = AdminService::new(storage.clone(), plants.clone(), seed, write_lock);
        let auth = AuthService::new(auth_config, provider, admin.clone(), storage);

        Self {
            plants,
            admin,
            auth,
            frontend_dir: frontend_dir.into(),
            started_at: Utc::now(),
        }
    }

    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let storage: Arc<dyn Storage> = match &config.storage_path {
            Some(path) => Arc::new(
                JsonFileStorage::open(path)
                    .await
                    .with_context(|| format!("Failed to open storage at {}", path.display()))?,
            ),
            None => Arc::new(MemoryStorage::new()),
        };

        let seed = StaticAllowlist::from_lists_or_demo(
            config.allowed_emails.clone(),
            config.admin_emails.clone(),
        );

        let provider: Option<Arc<dyn IdentityProvider>> =
            match (&config.google_client_id, &config.google_client_secret) {
                (Some(id), Some(secret)) => Some(Arc::new(GoogleProvider::new(
                    id.clone(),
                    secret.clone(),
                    config.redirect_url.clone(),
                ))),
                _ => None,
            };

        Ok(Self::new(
            storage,
            seed,
            AuthConfig::from_app_config(config),
            provider,
            config.frontend_dir.clone(),
        ))
    }
}
