//! Liveness endpoint.

use crate::mfa::MfaService;
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and store are reachable"),
        (status = 503, description = "Credential store is unavailable")
    ),
    tag = "health"
)]
pub async fn health(service: Extension<Arc<MfaService>>) -> impl IntoResponse {
    let body = Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }));

    let mut headers = HeaderMap::new();
    if let Ok(value) = crate::APP_USER_AGENT.parse() {
        headers.insert("X-App", value);
    }

    // A status read on a throwaway key exercises the store without touching
    // any real credential.
    let status = match service.status("healthcheck").await {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            error!("health check failed: {err:#}");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    (status, headers, body)
}
