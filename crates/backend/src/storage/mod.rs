//! Persistence contract for the plant, user and admin-config records.
//!
//! Storage is pure data access; lazy defaults and business rules live in
//! the services.

use async_trait::async_trait;
use shared_types::{AdminConfig, Plant, User};
use thiserror::Error;

mod file;
mod memory;
#[cfg(test)]
pub(crate) mod testing;

pub use file::JsonFileStorage;
pub use memory::MemoryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage snapshot is malformed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// The plant, or `None` before it has been created.
    async fn get_plant(&self) -> StorageResult<Option<Plant>>;

    async fn put_plant(&self, plant: Plant) -> StorageResult<()>;

    async fn get_user(&self, email: &str) -> StorageResult<Option<User>>;

    /// Inserts or replaces the user keyed by email.
    async fn put_user(&self, user: User) -> StorageResult<()>;

    async fn list_users(&self) -> StorageResult<Vec<User>>;

    /// The admin config, or `None` before it has been created.
    async fn get_admin_config(&self) -> StorageResult<Option<AdminConfig>>;

    async fn put_admin_config(&self, config: AdminConfig) -> StorageResult<()>;
}
