//! Lifecycle controller for MFA credentials.

use crate::{
    mfa::{backup, MfaError},
    store::{CredentialStore, MfaRecord, RecordUpdate, StoreError},
    totp::{TotpEngine, TotpError},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a provisioning call; the only time the secret and the full
/// backup-code set are ever returned to a caller.
#[derive(Clone, Debug)]
pub struct Provisioned {
    pub secret: String,
    pub otpauth_url: String,
    pub backup_codes: Vec<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MfaStatus {
    pub enabled: bool,
    pub backup_codes_remaining: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChallengeOutcome {
    pub used_backup_code: bool,
}

/// Orchestrates provision → verify → enable → challenge → consume over the
/// credential store. Holds no cross-request state: every operation re-reads
/// the current record before acting.
pub struct MfaService {
    store: Arc<dyn CredentialStore>,
    totp: TotpEngine,
}

impl MfaService {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, totp: TotpEngine) -> Self {
        Self { store, totp }
    }

    /// The TOTP engine, exposed so callers (and tests) can mint codes.
    #[must_use]
    pub fn totp(&self) -> &TotpEngine {
        &self.totp
    }

    /// Generate a new secret and backup codes, replacing any existing record
    /// wholesale. The previous secret and codes become invalid immediately.
    ///
    /// # Errors
    /// Fails with `Storage` if the record cannot be persisted.
    pub async fn provision(&self, user_id: &str) -> Result<Provisioned, MfaError> {
        let secret = self.totp.generate_secret(user_id).map_err(internal)?;
        let backup_codes = backup::generate_backup_codes();

        self.store
            .put(
                user_id,
                MfaRecord::new(secret.base32.clone(), backup_codes.clone()),
            )
            .await
            .map_err(storage)?;

        info!(user_id, "provisioned new MFA credential");

        Ok(Provisioned {
            secret: secret.base32,
            otpauth_url: secret.otpauth_url,
            backup_codes,
        })
    }

    /// Report whether MFA is enabled and how many backup codes remain.
    ///
    /// A user with no record reports disabled with zero codes; status never
    /// fails just because MFA was never set up.
    ///
    /// # Errors
    /// Fails with `Storage` if the store cannot be read.
    pub async fn status(&self, user_id: &str) -> Result<MfaStatus, MfaError> {
        match self.store.get(user_id).await.map_err(storage)? {
            Some(record) => Ok(MfaStatus {
                enabled: record.enabled,
                backup_codes_remaining: record.backup_codes.len(),
            }),
            None => Ok(MfaStatus {
                enabled: false,
                backup_codes_remaining: 0,
            }),
        }
    }

    /// Verify the first code against a freshly provisioned secret and mark
    /// the credential enabled.
    ///
    /// # Errors
    /// `NotFound` when no record exists, `InvalidToken` when the code does
    /// not verify (state unchanged), `Storage` on persistence failure.
    pub async fn enable(&self, user_id: &str, code: &str) -> Result<(), MfaError> {
        let record = self
            .store
            .get(user_id)
            .await
            .map_err(storage)?
            .ok_or(MfaError::NotFound)?;

        if !self.totp.verify(&record.secret, code).map_err(internal)? {
            return Err(MfaError::InvalidToken);
        }

        self.store
            .merge(user_id, RecordUpdate::Enable)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => MfaError::NotFound,
                other => storage(other),
            })?;

        info!(user_id, "MFA enabled");
        Ok(())
    }

    /// Verify a login-time challenge with either a TOTP code or a backup
    /// code (exactly one of the two).
    ///
    /// A matched backup code is consumed atomically; submitting it again
    /// fails. Both-present or both-absent inputs are caller errors detected
    /// before any verification.
    ///
    /// # Errors
    /// `Validation` for bad input shape, `NotSetUp` when the user has no
    /// record, `InvalidToken`/`InvalidBackupCode` on failed verification
    /// (state unchanged), `Storage` on persistence failure.
    pub async fn challenge(
        &self,
        user_id: &str,
        code: Option<&str>,
        backup_code: Option<&str>,
    ) -> Result<ChallengeOutcome, MfaError> {
        let (code, backup_code) = match (code, backup_code) {
            (Some(_), Some(_)) => {
                return Err(MfaError::Validation(
                    "Provide either a code or a backup code, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(MfaError::Validation(
                    "A code or a backup code is required".to_string(),
                ))
            }
            (code, backup_code) => (code, backup_code),
        };

        let record = self
            .store
            .get(user_id)
            .await
            .map_err(storage)?
            .ok_or(MfaError::NotSetUp)?;

        if !record.enabled {
            // Deliberately permissive; see DESIGN.md for the pending product
            // decision on rejecting this outright.
            warn!(user_id, "challenge against a provisioned but unverified credential");
        }

        if let Some(backup_code) = backup_code {
            let updated = self
                .store
                .merge(
                    user_id,
                    RecordUpdate::ConsumeBackupCode(backup_code.to_string()),
                )
                .await
                .map_err(|err| match err {
                    StoreError::BackupCodeMismatch => MfaError::InvalidBackupCode,
                    StoreError::NotFound => MfaError::NotSetUp,
                    other => storage(other),
                })?;

            info!(
                user_id,
                remaining = updated.backup_codes.len(),
                "backup code consumed"
            );
            return Ok(ChallengeOutcome {
                used_backup_code: true,
            });
        }

        let code = code.unwrap_or_default();
        if !self.totp.verify(&record.secret, code).map_err(internal)? {
            return Err(MfaError::InvalidToken);
        }

        Ok(ChallengeOutcome {
            used_backup_code: false,
        })
    }

    /// Drop the credential record, returning the user to an unenrolled
    /// state.
    ///
    /// # Errors
    /// `NotFound` when the user has no record, `Storage` on persistence
    /// failure.
    pub async fn reset(&self, user_id: &str) -> Result<(), MfaError> {
        self.store.delete(user_id).await.map_err(|err| match err {
            StoreError::NotFound => MfaError::NotFound,
            other => storage(other),
        })?;
        info!(user_id, "MFA credential deleted");
        Ok(())
    }
}

fn storage(err: StoreError) -> MfaError {
    match err {
        StoreError::NotFound => MfaError::NotFound,
        StoreError::BackupCodeMismatch => MfaError::InvalidBackupCode,
        StoreError::Unavailable(_) => MfaError::Storage(err),
    }
}

fn internal(err: TotpError) -> MfaError {
    MfaError::Internal(err.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    fn service() -> MfaService {
        MfaService::new(Arc::new(MemoryStore::new()), TotpEngine::new("Guardia"))
    }

    /// Reads pass through; every write fails as if the disk were gone.
    struct BrokenWrites {
        inner: MemoryStore,
    }

    fn disk_gone() -> StoreError {
        StoreError::Unavailable(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"))
    }

    #[async_trait]
    impl CredentialStore for BrokenWrites {
        async fn get(&self, user_id: &str) -> Result<Option<MfaRecord>, StoreError> {
            self.inner.get(user_id).await
        }

        async fn put(&self, _user_id: &str, _record: MfaRecord) -> Result<(), StoreError> {
            Err(disk_gone())
        }

        async fn merge(
            &self,
            _user_id: &str,
            _update: RecordUpdate,
        ) -> Result<MfaRecord, StoreError> {
            Err(disk_gone())
        }

        async fn delete(&self, _user_id: &str) -> Result<(), StoreError> {
            Err(disk_gone())
        }
    }

    #[tokio::test]
    async fn provision_then_status_is_disabled_with_full_codes() {
        let service = service();
        let provisioned = service.provision("u").await.unwrap();
        assert_eq!(provisioned.backup_codes.len(), 8);

        let status = service.status("u").await.unwrap();
        assert!(!status.enabled);
        assert_eq!(status.backup_codes_remaining, 8);
    }

    #[tokio::test]
    async fn status_of_unknown_user_never_fails() {
        let status = service().status("nobody").await.unwrap();
        assert!(!status.enabled);
        assert_eq!(status.backup_codes_remaining, 0);
    }

    #[tokio::test]
    async fn enable_with_valid_code_flips_status() {
        let service = service();
        let provisioned = service.provision("u").await.unwrap();
        let code = service.totp().generate_current(&provisioned.secret).unwrap();

        service.enable("u", &code).await.unwrap();

        let status = service.status("u").await.unwrap();
        assert!(status.enabled);
    }

    #[tokio::test]
    async fn enable_with_wrong_code_leaves_state_unchanged() {
        let service = service();
        let provisioned = service.provision("u").await.unwrap();
        let code = service.totp().generate_current(&provisioned.secret).unwrap();
        let wrong = if code == "000000" { "000001" } else { "000000" };

        let result = service.enable("u", wrong).await;
        assert!(matches!(result, Err(MfaError::InvalidToken)));
        assert!(!service.status("u").await.unwrap().enabled);
    }

    #[tokio::test]
    async fn enable_without_record_is_not_found() {
        let result = service().enable("nobody", "123456").await;
        assert!(matches!(result, Err(MfaError::NotFound)));
    }

    #[tokio::test]
    async fn challenge_with_totp_code_succeeds() {
        let service = service();
        let provisioned = service.provision("u").await.unwrap();
        let code = service.totp().generate_current(&provisioned.secret).unwrap();
        service.enable("u", &code).await.unwrap();

        let outcome = service.challenge("u", Some(&code), None).await.unwrap();
        assert!(!outcome.used_backup_code);
    }

    #[tokio::test]
    async fn backup_code_is_single_use() {
        let service = service();
        let provisioned = service.provision("u").await.unwrap();
        let backup = provisioned.backup_codes[0].clone();

        let outcome = service.challenge("u", None, Some(&backup)).await.unwrap();
        assert!(outcome.used_backup_code);
        assert_eq!(service.status("u").await.unwrap().backup_codes_remaining, 7);

        let replay = service.challenge("u", None, Some(&backup)).await;
        assert!(matches!(replay, Err(MfaError::InvalidBackupCode)));
        assert_eq!(service.status("u").await.unwrap().backup_codes_remaining, 7);
    }

    #[tokio::test]
    async fn challenge_rejects_both_and_neither() {
        let service = service();
        service.provision("u").await.unwrap();

        let both = service
            .challenge("u", Some("123456"), Some("aaaa-bbbb-cccc-dddd"))
            .await;
        assert!(matches!(both, Err(MfaError::Validation(_))));

        let neither = service.challenge("u", None, None).await;
        assert!(matches!(neither, Err(MfaError::Validation(_))));
    }

    #[tokio::test]
    async fn challenge_input_shape_checked_before_store() {
        // Caller errors must never surface as InvalidToken, even for users
        // with no record at all.
        let result = service().challenge("nobody", None, None).await;
        assert!(matches!(result, Err(MfaError::Validation(_))));
    }

    #[tokio::test]
    async fn challenge_without_record_is_not_set_up() {
        let result = service().challenge("nobody", Some("123456"), None).await;
        assert!(matches!(result, Err(MfaError::NotSetUp)));
    }

    #[tokio::test]
    async fn concurrent_distinct_backup_codes_both_consume() {
        let service = Arc::new(service());
        let provisioned = service.provision("u").await.unwrap();
        let first_code = provisioned.backup_codes[0].clone();
        let second_code = provisioned.backup_codes[1].clone();

        let first = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.challenge("u", None, Some(&first_code)).await })
        };
        let second = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.challenge("u", None, Some(&second_code)).await })
        };

        assert!(first.await.unwrap().unwrap().used_backup_code);
        assert!(second.await.unwrap().unwrap().used_backup_code);
        assert_eq!(service.status("u").await.unwrap().backup_codes_remaining, 6);
    }

    #[tokio::test]
    async fn reprovision_invalidates_old_secret_and_codes() {
        let service = service();
        let first = service.provision("u").await.unwrap();
        let old_backup = first.backup_codes[0].clone();

        let second = service.provision("u").await.unwrap();
        assert_ne!(first.secret, second.secret);

        let result = service.challenge("u", None, Some(&old_backup)).await;
        assert!(matches!(result, Err(MfaError::InvalidBackupCode)));
        assert!(!service.status("u").await.unwrap().enabled);
    }

    #[tokio::test]
    async fn enable_write_failure_surfaces_as_storage_error() {
        // A valid code must not report enabled-success when the persistence
        // write fails.
        let totp = TotpEngine::new("Guardia");
        let secret = totp.generate_secret("u").unwrap();
        let inner = MemoryStore::new();
        inner
            .put("u", MfaRecord::new(secret.base32.clone(), vec![]))
            .await
            .unwrap();
        let service = MfaService::new(Arc::new(BrokenWrites { inner }), totp);

        let code = service.totp().generate_current(&secret.base32).unwrap();
        let result = service.enable("u", &code).await;
        assert!(matches!(result, Err(MfaError::Storage(_))));
    }

    #[tokio::test]
    async fn provision_write_failure_surfaces_as_storage_error() {
        let service = MfaService::new(
            Arc::new(BrokenWrites {
                inner: MemoryStore::new(),
            }),
            TotpEngine::new("Guardia"),
        );

        let result = service.provision("u").await;
        assert!(matches!(result, Err(MfaError::Storage(_))));
    }

    #[tokio::test]
    async fn backup_consume_write_failure_surfaces_as_storage_error() {
        let totp = TotpEngine::new("Guardia");
        let secret = totp.generate_secret("u").unwrap();
        let inner = MemoryStore::new();
        inner
            .put(
                "u",
                MfaRecord::new(secret.base32, vec!["aaaa-bbbb-cccc-dddd".to_string()]),
            )
            .await
            .unwrap();
        let service = MfaService::new(Arc::new(BrokenWrites { inner }), totp);

        let result = service
            .challenge("u", None, Some("aaaa-bbbb-cccc-dddd"))
            .await;
        assert!(matches!(result, Err(MfaError::Storage(_))));
    }

    #[tokio::test]
    async fn reset_returns_user_to_unenrolled() {
        let service = service();
        service.provision("u").await.unwrap();
        service.reset("u").await.unwrap();

        let status = service.status("u").await.unwrap();
        assert!(!status.enabled);
        assert_eq!(status.backup_codes_remaining, 0);
        assert!(matches!(
            service.reset("u").await,
            Err(MfaError::NotFound)
        ));
    }
}
