//! TOTP engine: secret provisioning and time-based code verification.
//!
//! Codes are 6 digits over a 30-second step with a skew of one step, so a
//! submitted code is accepted within a 90-second window around the current
//! time. Verification is a pure function of (secret, time, code); persisting
//! the outcome is the caller's job.

use totp_rs::{Algorithm, Secret, TOTP};

pub const DIGITS: usize = 6;
pub const STEP_SECONDS: u64 = 30;
pub const SKEW_STEPS: u8 = 1;

#[derive(Debug, thiserror::Error)]
pub enum TotpError {
    #[error("invalid TOTP secret: {0}")]
    InvalidSecret(String),
}

/// Freshly generated shared secret in both renderable forms.
#[derive(Clone, Debug)]
pub struct ProvisionedSecret {
    /// Base32 form for manual entry into an authenticator app.
    pub base32: String,
    /// `otpauth://` URI for QR rendering.
    pub otpauth_url: String,
}

#[derive(Clone, Debug)]
pub struct TotpEngine {
    issuer: String,
}

impl TotpEngine {
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
        }
    }

    /// Generate a new 160-bit random secret for `account_name`.
    ///
    /// # Errors
    /// Returns an error if the generated secret cannot back a TOTP instance,
    /// which indicates a malformed issuer or account label.
    pub fn generate_secret(&self, account_name: &str) -> Result<ProvisionedSecret, TotpError> {
        let secret = Secret::generate_secret();
        let base32 = secret.to_encoded().to_string();
        let totp = self.build(&base32, account_name)?;
        Ok(ProvisionedSecret {
            otpauth_url: totp.get_url(),
            base32,
        })
    }

    /// Verify a submitted code against the current time.
    ///
    /// Codes that are not exactly six ASCII digits are rejected before the
    /// secret is touched.
    ///
    /// # Errors
    /// Returns an error only when `secret` is not valid base32.
    pub fn verify(&self, secret: &str, code: &str) -> Result<bool, TotpError> {
        if !well_formed_code(code) {
            return Ok(false);
        }
        let totp = self.build(secret, "user")?;
        match totp.check_current(code) {
            Ok(valid) => Ok(valid),
            Err(err) => {
                // Likely a system clock issue; report a plain mismatch rather
                // than leaking why verification failed.
                tracing::warn!(error = %err, "TOTP verification error");
                Ok(false)
            }
        }
    }

    /// Verify a submitted code at an explicit unix timestamp.
    ///
    /// # Errors
    /// Returns an error only when `secret` is not valid base32.
    pub fn verify_at(&self, secret: &str, code: &str, time: u64) -> Result<bool, TotpError> {
        if !well_formed_code(code) {
            return Ok(false);
        }
        let totp = self.build(secret, "user")?;
        Ok(totp.check(code, time))
    }

    /// Generate the code for an explicit unix timestamp.
    ///
    /// # Errors
    /// Returns an error only when `secret` is not valid base32.
    pub fn generate_at(&self, secret: &str, time: u64) -> Result<String, TotpError> {
        let totp = self.build(secret, "user")?;
        Ok(totp.generate(time))
    }

    /// Generate the code for the current time step.
    ///
    /// # Errors
    /// Returns an error when `secret` is not valid base32 or the system
    /// clock is unreadable.
    pub fn generate_current(&self, secret: &str) -> Result<String, TotpError> {
        let totp = self.build(secret, "user")?;
        totp.generate_current()
            .map_err(|err| TotpError::InvalidSecret(err.to_string()))
    }

    fn build(&self, secret: &str, account_name: &str) -> Result<TOTP, TotpError> {
        TOTP::new(
            Algorithm::SHA1,
            DIGITS,
            SKEW_STEPS,
            STEP_SECONDS,
            Secret::Encoded(secret.to_string())
                .to_bytes()
                .map_err(|err| TotpError::InvalidSecret(format!("{err:?}")))?,
            Some(self.issuer.clone()),
            account_name.to_string(),
        )
        .map_err(|err| TotpError::InvalidSecret(err.to_string()))
    }
}

fn well_formed_code(code: &str) -> bool {
    code.len() == DIGITS && code.bytes().all(|byte| byte.is_ascii_digit())
}
