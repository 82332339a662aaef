use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{AdminConfig, Plant, User};
use tokio::sync::Mutex;

use super::{Storage, StorageResult};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Snapshot {
    plant: Option<Plant>,
    #[serde(default)]
    users: BTreeMap<String, User>,
    config: Option<AdminConfig>,
}

/// Keeps every record in memory and rewrites a JSON snapshot file after
/// each mutation.
pub struct JsonFileStorage {
    path: PathBuf,
    snapshot: Mutex<Snapshot>,
}

impl JsonFileStorage {
    /// Opens the snapshot at `path`, starting empty if the file is missing.
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No storage snapshot at {}, starting empty", path.display());
                Snapshot::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            snapshot: Mutex::new(snapshot),
        })
    }

    /// Writes to a sibling temp file, then renames over the snapshot.
    async fn persist(&self, snapshot: &Snapshot) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn get_plant(&self) -> StorageResult<Option<Plant>> {
        Ok(self.snapshot.lock().await.plant.clone())
    }

    async fn put_plant(&self, plant: Plant) -> StorageResult<()> {
        let mut snapshot = self.snapshot.lock().await;
        let mut next = snapshot.clone();
        next.plant = Some(plant);
        self.persist(&next).await?;
        *snapshot = next;
        Ok(())
    }

    async fn get_user(&self, email: &str) -> StorageResult<Option<User>> {
        Ok(self.snapshot.lock().await.users.get(email).cloned())
    }

    async fn put_user(&self, user: User) -> StorageResult<()> {
        let mut snapshot = self.snapshot.lock().await;
        let mut next = snapshot.clone();
        next.users.insert(user.email.clone(), user);
        self.persist(&next).await?;
        *snapshot = next;
        Ok(())
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        Ok(self.snapshot.lock().await.users.values().cloned().collect())
    }

    async fn get_admin_config(&self) -> StorageResult<Option<AdminConfig>> {
        Ok(self.snapshot.lock().await.config.clone())
    }

    async fn put_admin_config(&self, config: AdminConfig) -> StorageResult<()> {
        let mut snapshot = self.snapshot.lock().await;
        let mut next = snapshot.clone();
        next.config = Some(config);
        self.persist(&next).await?;
        *snapshot = next;
        Ok(())
    }
}
