//! Durable JSON-file store.
//!
//! Records live in a single keyed JSON object (one entry per user id) that
//! survives process restarts. All mutations run under one async write lock and
//! are persisted with a temp-file + rename, so a crash mid-write never leaves
//! a partially written store visible to readers. In-memory state is committed
//! only after the file write succeeds.

use super::{apply_update, CredentialStore, MfaRecord, RecordUpdate, StoreError};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::RwLock};
use tracing::debug;

pub struct FileStore {
    path: PathBuf,
    records: RwLock<HashMap<String, MfaRecord>>,
}

impl FileStore {
    /// Open (or create) the store at `path`, loading any existing records.
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if the file exists but cannot be
    /// read or parsed, or if the parent directory cannot be created.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let records = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(StoreError::serde)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };

        debug!(path = %path.display(), "opened MFA store");

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &HashMap<String, MfaRecord>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records).map_err(StoreError::serde)?;
        // Writers are serialized by the lock, so a single temp name suffices.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn get(&self, user_id: &str) -> Result<Option<MfaRecord>, StoreError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn put(&self, user_id: &str, record: MfaRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let previous = records.insert(user_id.to_string(), record);
        if let Err(err) = self.persist(&records).await {
            match previous {
                Some(prev) => records.insert(user_id.to_string(), prev),
                None => records.remove(user_id),
            };
            return Err(err);
        }
        Ok(())
    }

    async fn merge(&self, user_id: &str, update: RecordUpdate) -> Result<MfaRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(user_id).ok_or(StoreError::NotFound)?;
        let previous = record.clone();
        apply_update(record, &update)?;
        let updated = record.clone();
        if let Err(err) = self.persist(&records).await {
            records.insert(user_id.to_string(), previous);
            return Err(err);
        }
        Ok(updated)
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let previous = records.remove(user_id).ok_or(StoreError::NotFound)?;
        if let Err(err) = self.persist(&records).await {
            records.insert(user_id.to_string(), previous);
            return Err(err);
        }
        Ok(())
    }
}
