//! In-memory store used by tests and as the reference implementation.

use super::{apply_update, CredentialStore, MfaRecord, RecordUpdate, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Non-durable [`CredentialStore`] backed by a `HashMap`.
///
/// Writers serialize on the lock, so transitions always see the latest value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, MfaRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, user_id: &str) -> Result<Option<MfaRecord>, StoreError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn put(&self, user_id: &str, record: MfaRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(user_id.to_string(), record);
        Ok(())
    }

    async fn merge(&self, user_id: &str, update: RecordUpdate) -> Result<MfaRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(user_id).ok_or(StoreError::NotFound)?;
        apply_update(record, &update)?;
        Ok(record.clone())
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        match self.records.write().await.remove(user_id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}
