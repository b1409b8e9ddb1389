//! # Guardia (TOTP MFA demo service)
//!
//! `guardia` is a small multi-factor authentication service built around
//! time-based one-time passwords (RFC 6238).
//!
//! ## Enrollment flow
//!
//! 1. **Provision**: generate a fresh base32 secret, an `otpauth://` URI for
//!    QR rendering, and eight single-use backup codes. Re-provisioning
//!    replaces the record wholesale; old secrets and codes die immediately.
//! 2. **Enable**: the user proves possession of their authenticator by
//!    submitting a first valid code, which flips the credential to enabled.
//! 3. **Challenge**: at login, a TOTP code or exactly one backup code is
//!    accepted. A matched backup code is consumed atomically and can never be
//!    replayed.
//!
//! ## Persistence
//!
//! Credentials live behind the [`store::CredentialStore`] trait. The default
//! [`store::FileStore`] keeps a JSON file on disk with atomic
//! write-temp-then-rename persistence; [`store::MemoryStore`] backs tests.
//! Backup-code consumption is expressed as a named transition applied inside
//! the store, so two concurrent consumes of different codes both land.

pub mod api;
pub mod cli;
pub mod mfa;
pub mod store;
pub mod totp;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
