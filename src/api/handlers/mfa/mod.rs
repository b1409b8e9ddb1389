//! MFA endpoints: provisioning, status, enablement, and login challenges.
//!
//! Flow:
//! 1) `POST /api/mfa/generate` provisions a secret + backup codes for
//!    one-time display.
//! 2) The user proves possession via `POST /api/mfa/enable` with a first
//!    TOTP code, flipping the credential to enabled.
//! 3) At login, `POST /api/mfa/verify` accepts a TOTP code or consumes a
//!    single backup code.

pub mod types;

use crate::mfa::{MfaError, MfaService};
use axum::{
    extract::{Extension, Query},
    Json,
};
use std::sync::Arc;
use tracing::debug;
use self::types::{
    EnableRequest, EnableResponse, GenerateRequest, GenerateResponse, StatusParams,
    StatusResponse, VerifyRequest, VerifyResponse,
};

fn required_user_id(user_id: Option<String>) -> Result<String, MfaError> {
    match user_id {
        Some(user_id) if !user_id.trim().is_empty() => Ok(user_id),
        _ => Err(MfaError::Validation("User ID is required".to_string())),
    }
}

#[utoipa::path(
    post,
    path = "/api/mfa/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "New secret and backup codes", body = GenerateResponse),
        (status = 400, description = "Missing user ID", body = crate::mfa::error::ErrorBody)
    ),
    tag = "mfa"
)]
pub async fn generate(
    service: Extension<Arc<MfaService>>,
    payload: Option<Json<GenerateRequest>>,
) -> Result<Json<GenerateResponse>, MfaError> {
    let Some(Json(request)) = payload else {
        return Err(MfaError::Validation("Missing payload".to_string()));
    };
    let user_id = required_user_id(request.user_id)?;

    let provisioned = service.provision(&user_id).await?;

    Ok(Json(GenerateResponse {
        secret: provisioned.secret,
        otpauth_url: provisioned.otpauth_url,
        backup_codes: provisioned.backup_codes,
    }))
}

#[utoipa::path(
    get,
    path = "/api/mfa/status",
    params(StatusParams),
    responses(
        (status = 200, description = "Current MFA status", body = StatusResponse),
        (status = 400, description = "Missing user ID", body = crate::mfa::error::ErrorBody)
    ),
    tag = "mfa"
)]
pub async fn status(
    service: Extension<Arc<MfaService>>,
    Query(params): Query<StatusParams>,
) -> Result<Json<StatusResponse>, MfaError> {
    let user_id = required_user_id(params.user_id)?;

    let status = service.status(&user_id).await?;

    Ok(Json(StatusResponse {
        enabled: status.enabled,
        backup_codes_remaining: status.backup_codes_remaining,
    }))
}

#[utoipa::path(
    post,
    path = "/api/mfa/enable",
    request_body = EnableRequest,
    responses(
        (status = 200, description = "MFA enabled", body = EnableResponse),
        (status = 400, description = "Missing fields or invalid code", body = crate::mfa::error::ErrorBody),
        (status = 404, description = "No provisioned secret", body = crate::mfa::error::ErrorBody)
    ),
    tag = "mfa"
)]
pub async fn enable(
    service: Extension<Arc<MfaService>>,
    payload: Option<Json<EnableRequest>>,
) -> Result<Json<EnableResponse>, MfaError> {
    let Some(Json(request)) = payload else {
        return Err(MfaError::Validation("Missing payload".to_string()));
    };
    let user_id = required_user_id(request.user_id)?;
    let Some(code) = request.code else {
        return Err(MfaError::Validation(
            "User ID and code are required".to_string(),
        ));
    };

    service.enable(&user_id, &code).await?;

    Ok(Json(EnableResponse {
        success: true,
        message: "MFA has been enabled successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/mfa/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Challenge passed", body = VerifyResponse),
        (status = 400, description = "Invalid code, invalid backup code, or bad input shape", body = crate::mfa::error::ErrorBody),
        (status = 404, description = "MFA not set up", body = crate::mfa::error::ErrorBody)
    ),
    tag = "mfa"
)]
pub async fn verify(
    service: Extension<Arc<MfaService>>,
    payload: Option<Json<VerifyRequest>>,
) -> Result<Json<VerifyResponse>, MfaError> {
    let Some(Json(request)) = payload else {
        return Err(MfaError::Validation("Missing payload".to_string()));
    };
    let user_id = required_user_id(request.user_id)?;

    debug!(
        user_id,
        has_code = request.code.is_some(),
        has_backup_code = request.backup_code.is_some(),
        "MFA challenge"
    );

    let outcome = service
        .challenge(
            &user_id,
            request.code.as_deref(),
            request.backup_code.as_deref(),
        )
        .await?;

    Ok(Json(VerifyResponse {
        valid: true,
        used_backup_code: outcome.used_backup_code.then_some(true),
    }))
}
