//! Demo password login.
//!
//! There is no real user database: a single hard-coded demo account stands in
//! for the password layer so the MFA flow has something to hang off. The
//! handler still validates input shape before touching anything and reports
//! whether the account requires an MFA challenge.

use crate::{
    api::handlers::valid_email,
    mfa::{MfaError, MfaService},
};
use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;

pub const DEMO_EMAIL: &str = "user@example.com";
pub const DEMO_PASSWORD: &str = "demo123";
pub const DEMO_USER_ID: &str = "demo-user-123";

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub user_id: String,
    pub email: String,
    #[serde(rename = "requiresMFA")]
    pub requires_mfa: bool,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing or malformed fields", body = crate::mfa::error::ErrorBody),
        (status = 401, description = "Invalid credentials", body = crate::mfa::error::ErrorBody)
    ),
    tag = "auth"
)]
pub async fn login(
    service: Extension<Arc<MfaService>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Json<LoginResponse>, MfaError> {
    let Some(Json(request)) = payload else {
        return Err(MfaError::Validation("Missing payload".to_string()));
    };

    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(MfaError::Validation(
            "Email and password are required".to_string(),
        ));
    };

    if !valid_email(&email) {
        return Err(MfaError::Validation("Invalid email".to_string()));
    }

    if email != DEMO_EMAIL || password != DEMO_PASSWORD {
        debug!("login rejected for {email}");
        return Err(MfaError::InvalidCredentials);
    }

    let status = service.status(DEMO_USER_ID).await?;

    info!(user_id = DEMO_USER_ID, requires_mfa = status.enabled, "login successful");

    Ok(Json(LoginResponse {
        success: true,
        user_id: DEMO_USER_ID.to_string(),
        email,
        requires_mfa: status.enabled,
    }))
}
