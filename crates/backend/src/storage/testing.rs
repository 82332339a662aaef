//! In-memory storage that can be told to fail individual operations.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use shared_types::{AdminConfig, Plant, User};

use super::{MemoryStorage, Storage, StorageError, StorageResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    GetPlant,
    PutPlant,
    GetAdminConfig,
    PutAdminConfig,
}

#[derive(Default)]
pub(crate) struct FlakyStorage {
    inner: MemoryStorage,
    failing: Mutex<HashSet<Op>>,
}

impl FlakyStorage {
    pub(crate) fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    pub(crate) fn recover(&self, op: Op) {
        self.failing.lock().unwrap().remove(&op);
    }

    fn check(&self, op: Op) -> StorageResult<()> {
        if self.failing.lock().unwrap().contains(&op) {
            return Err(StorageError::Unavailable(format!("{:?} failed", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn get_plant(&self) -> StorageResult<Option<Plant>> {
        self.check(Op::GetPlant)?;
        self.inner.get_plant().await
    }

    async fn put_plant(&self, plant: Plant) -> StorageResult<()> {
        self.check(Op::PutPlant)?;
        self.inner.put_plant(plant).await
    }

    async fn get_user(&self, email: &str) -> StorageResult<Option<User>> {
        self.inner.get_user(email).await
    }

    async fn put_user(&self, user: User) -> StorageResult<()> {
        self.inner.put_user(user).await
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        self.inner.list_users().await
    }

    async fn get_admin_config(&self) -> StorageResult<Option<AdminConfig>> {
        self.check(Op::GetAdminConfig)?;
        self.inner.get_admin_config().await
    }

    async fn put_admin_config(&self, config: AdminConfig) -> StorageResult<()> {
        self.check(Op::PutAdminConfig)?;
        self.inner.put_admin_config(config).await
    }
}
