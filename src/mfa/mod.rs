//! MFA credential lifecycle: provisioning, enablement, and challenges.
//!
//! [`MfaService`] is the only caller of the credential store and the two
//! credential primitives (the TOTP engine and backup-code generation).
//! External collaborators (login flow, setup wizard) go through its
//! operations and never touch the store directly.

pub mod backup;
pub mod error;
pub mod service;

pub use backup::{generate_backup_codes, BACKUP_CODE_COUNT};
pub use error::MfaError;
pub use service::{ChallengeOutcome, MfaService, MfaStatus, Provisioned};
