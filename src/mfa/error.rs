//! Error taxonomy for MFA operations.
//!
//! Every failure carries a machine-distinguishable category plus a
//! human-readable message; handlers return them as JSON so callers can
//! branch on `error` without parsing `message`.

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error)]
pub enum MfaError {
    /// Missing or malformed caller input; raised before any storage access.
    #[error("{0}")]
    Validation(String),
    /// Demo login credential mismatch.
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// The operation requires a provisioned record that does not exist.
    #[error("MFA secret not found. Please generate a new secret.")]
    NotFound,
    /// Challenge against a user with no MFA record at all.
    #[error("MFA not set up for this user")]
    NotSetUp,
    /// TOTP verification failed; state unchanged.
    #[error("Invalid token. Please try again.")]
    InvalidToken,
    /// Backup code matched none of the stored codes; state unchanged.
    #[error("Invalid backup code")]
    InvalidBackupCode,
    /// The persistence layer could not be read or written.
    #[error("storage unavailable")]
    Storage(#[source] StoreError),
    /// Unexpected internal failure (for example a corrupt stored secret).
    #[error("{0}")]
    Internal(String),
}

impl MfaError {
    /// Stable category identifier for callers.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvalidCredentials => "invalid_credentials",
            Self::NotFound => "not_found",
            Self::NotSetUp => "not_set_up",
            Self::InvalidToken => "invalid_token",
            Self::InvalidBackupCode => "invalid_backup_code",
            Self::Storage(_) => "storage_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidToken | Self::InvalidBackupCode => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound | Self::NotSetUp => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body returned by every failing endpoint.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable category, e.g. `invalid_token`.
    pub error: String,
    /// Human-readable description.
    pub message: String,
}

impl IntoResponse for MfaError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Storage(_) | Self::Internal(_)) {
            error!(category = self.category(), "request failed: {self:#}");
        }
        let body = ErrorBody {
            error: self.category().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
