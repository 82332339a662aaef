//! Watering, resetting and configuring the plant.

use std::sync::Arc;

use chrono::Utc;
use shared_types::{Plant, PlantStatusResponse, PlantTimerResponse};

use super::{ServiceError, ServiceResult, StorageContext, WriteLock};
use crate::storage::Storage;

/// Service for plant-related business logic
#[derive(Clone)]
pub struct PlantService {
    storage: Arc<dyn Storage>,
    write_lock: WriteLock,
}

impl PlantService {
    pub fn new(storage: Arc<dyn Storage>, write_lock: WriteLock) -> Self {
        Self {
            storage,
            write_lock,
        }
    }

    /// Current plant, created with defaults on first access.
    pub async fn get_plant(&self) -> ServiceResult<Plant> {
        if let Some(plant) = self
            .storage
            .get_plant()
            .await
            .context("Failed to get plant state")?
        {
            return Ok(plant);
        }

        let _guard = self.write_lock.lock().await;
        self.load_or_create().await
    }

    /// Caller must hold the write lock.
    pub(crate) async fn load_or_create(&self) -> ServiceResult<Plant> {
        if let Some(plant) = self
            .storage
            .get_plant()
            .await
            .context("Failed to get plant state")?
        {
            return Ok(plant);
        }

        let plant = Plant::new_default(Utc::now());
        if let Err(e) = self.storage.put_plant(plant.clone()).await {
            tracing::warn!("Failed to save default plant: {}", e);
        } else {
            tracing::info!("Created default plant \"{}\"", plant.name);
        }
        Ok(plant)
    }

    pub async fn water(&self, actor: &str) -> ServiceResult<Plant> {
        let actor = actor.trim();
        if actor.is_empty() {
            return Err(ServiceError::ActorRequired);
        }

        let _guard = self.write_lock.lock().await;
        let mut plant = self.load_or_create().await?;
        let now = Utc::now();
        plant.water(actor, now);

        self.storage
            .put_plant(plant.clone())
            .await
            .context("Failed to save watered plant")?;

        tracing::info!("Plant watered by {} at {}", actor, now.to_rfc3339());
        Ok(plant)
    }

    pub async fn get_status(&self) -> ServiceResult<PlantStatusResponse> {
        let plant = self.get_plant().await?;
        Ok(PlantStatusResponse::from_plant_at(&plant, Utc::now()))
    }

    pub async fn get_timer(&self) -> ServiceResult<PlantTimerResponse> {
        let plant = self.get_plant().await?;
        Ok(PlantTimerResponse::from_plant_at(&plant, Utc::now()))
    }

    pub async fn reset(&self) -> ServiceResult<Plant> {
        let _guard = self.write_lock.lock().await;
        let mut plant = self.load_or_create().await?;
        plant.reset(Utc::now());

        self.storage
            .put_plant(plant.clone())
            .await
            .context("Failed to reset plant")?;

        tracing::info!("Plant reset to unwatered state");
        Ok(plant)
    }
}
