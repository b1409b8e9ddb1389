//! Persistence contract for MFA credential records.
//!
//! The store is the only shared mutable resource in the service. It maps a
//! user identifier to at most one [`MfaRecord`] and guarantees that partial
//! updates ([`merge`](CredentialStore::merge)) are applied read-modify-write
//! against the latest persisted value, serialized per key. Whole-record
//! overwrite is reserved for provisioning ([`put`](CredentialStore::put)),
//! which replaces the record wholesale.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Per-user MFA credential record.
///
/// The secret is immutable once created; re-provisioning replaces the whole
/// record and invalidates the previous backup codes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaRecord {
    /// Base32-encoded shared secret.
    pub secret: String,
    /// Remaining single-use backup codes; shrinks as codes are consumed.
    pub backup_codes: Vec<String>,
    /// Set after the first successful TOTP verification for this secret.
    #[serde(default)]
    pub enabled: bool,
}

impl MfaRecord {
    #[must_use]
    pub fn new(secret: String, backup_codes: Vec<String>) -> Self {
        Self {
            secret,
            backup_codes,
            enabled: false,
        }
    }
}

/// Named record transitions accepted by [`CredentialStore::merge`].
///
/// Updates are modelled as transitions rather than field patches so a stale
/// in-memory copy can never clobber a concurrent consume or enable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecordUpdate {
    /// Mark the credential as enabled after a verified TOTP code.
    Enable,
    /// Remove exactly one backup code by exact, case-sensitive match.
    ConsumeBackupCode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The user has no credential record.
    #[error("no MFA record for user")]
    NotFound,
    /// `ConsumeBackupCode` matched none of the stored codes.
    #[error("backup code did not match any stored code")]
    BackupCodeMismatch,
    /// The backing medium could not be read or written.
    #[error("storage unavailable")]
    Unavailable(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn serde(err: serde_json::Error) -> Self {
        Self::Unavailable(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    }
}

/// Durable keyed collection of MFA credential records.
///
/// Implementations must support concurrent readers and serialize conflicting
/// writers per key; `merge` always operates on the latest persisted value.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the record for a user. Absence is `Ok(None)`, never an error.
    async fn get(&self, user_id: &str) -> Result<Option<MfaRecord>, StoreError>;

    /// Write (or replace) the whole record for a user.
    async fn put(&self, user_id: &str, record: MfaRecord) -> Result<(), StoreError>;

    /// Apply a named transition against the latest persisted record and
    /// return the updated record.
    async fn merge(&self, user_id: &str, update: RecordUpdate) -> Result<MfaRecord, StoreError>;

    /// Remove the record for a user.
    async fn delete(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Apply a transition to a record in place.
///
/// Shared by store implementations so consume/enable semantics cannot drift
/// between backends.
pub(crate) fn apply_update(record: &mut MfaRecord, update: &RecordUpdate) -> Result<(), StoreError> {
    match update {
        RecordUpdate::Enable => {
            record.enabled = true;
            Ok(())
        }
        RecordUpdate::ConsumeBackupCode(code) => {
            match record.backup_codes.iter().position(|stored| stored == code) {
                Some(index) => {
                    record.backup_codes.remove(index);
                    Ok(())
                }
                None => Err(StoreError::BackupCodeMismatch),
            }
        }
    }
}
