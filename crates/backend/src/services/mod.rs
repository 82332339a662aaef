//! Business logic between the HTTP handlers and storage.
//!
//! Services return [`ServiceError`]; handlers turn it into a status code.

use std::sync::Arc;

use shared_types::ValidationError;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::storage::StorageError;

pub mod admin;
pub mod plant;

pub use admin::{AdminService, StaticAllowlist};
pub use plant::PlantService;

/// Serialises read-modify-write sequences on the singleton records.
pub type WriteLock = Arc<Mutex<()>>;

pub fn new_write_lock() -> WriteLock {
    Arc::new(Mutex::new(()))
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid plant settings: {0}")]
    InvalidPlant(#[from] ValidationError),

    #[error("{0}")]
    Validation(String),

    #[error("watered_by field is required")]
    ActorRequired,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: StorageError,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Attaches a caller-facing message to a storage failure.
pub(crate) trait StorageContext<T> {
    fn context(self, context: &str) -> ServiceResult<T>;
}

impl<T> StorageContext<T> for Result<T, StorageError> {
    fn context(self, context: &str) -> ServiceResult<T> {
        self.map_err(|source| ServiceError::Storage {
            context: context.to_string(),
            source,
        })
    }
}
