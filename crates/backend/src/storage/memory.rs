use std::collections::HashMap;

use async_trait::async_trait;
use shared_types::{AdminConfig, Plant, User};
use tokio::sync::RwLock;

use super::{Storage, StorageResult};

/// In-memory storage with one lock per record.
#[derive(Default)]
pub struct MemoryStorage {
    plant: RwLock<Option<Plant>>,
    users: RwLock<HashMap<String, User>>,
    config: RwLock<Option<AdminConfig>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_plant(&self) -> StorageResult<Option<Plant>> {
        Ok(self.plant.read().await.clone())
    }

    async fn put_plant(&self, plant: Plant) -> StorageResult<()> {
        *self.plant.write().await = Some(plant);
        Ok(())
    }

    async fn get_user(&self, email: &str) -> StorageResult<Option<User>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn put_user(&self, user: User) -> StorageResult<()> {
        self.users.write().await.insert(user.email.clone(), user);
        Ok(())
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn get_admin_config(&self) -> StorageResult<Option<AdminConfig>> {
        Ok(self.config.read().await.clone())
    }

    async fn put_admin_config(&self, config: AdminConfig) -> StorageResult<()> {
        *self.config.write().await = Some(config);
        Ok(())
    }
}
