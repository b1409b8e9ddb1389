//! Request/response types for the MFA endpoints.
//!
//! Field names are camelCase on the wire (`userId`, `backupCodes`, …) to
//! match the contract the setup wizard and login flow consume.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub user_id: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Base32 secret for manual entry. Shown once; never returned again.
    pub secret: String,
    /// `otpauth://` URI for QR rendering.
    pub otpauth_url: String,
    /// Eight single-use recovery codes. Shown once; never returned again.
    pub backup_codes: Vec<String>,
}

#[derive(IntoParams, Deserialize, Debug)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct StatusParams {
    /// User identifier to report on.
    pub user_id: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub enabled: bool,
    pub backup_codes_remaining: usize,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EnableRequest {
    pub user_id: Option<String>,
    pub code: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct EnableResponse {
    pub success: bool,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub user_id: Option<String>,
    pub code: Option<String>,
    pub backup_code: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_backup_code: Option<bool>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn verify_request_accepts_either_field() {
        let request: VerifyRequest =
            serde_json::from_str(r#"{"userId":"u","backupCode":"aaaa-bbbb-cccc-dddd"}"#).unwrap();
        assert_eq!(request.user_id.as_deref(), Some("u"));
        assert!(request.code.is_none());
        assert_eq!(request.backup_code.as_deref(), Some("aaaa-bbbb-cccc-dddd"));
    }

    #[test]
    fn verify_response_omits_flag_for_totp_path() {
        let value = serde_json::to_value(VerifyResponse {
            valid: true,
            used_backup_code: None,
        })
        .unwrap();
        assert!(value.get("usedBackupCode").is_none());

        let value = serde_json::to_value(VerifyResponse {
            valid: true,
            used_backup_code: Some(true),
        })
        .unwrap();
        assert_eq!(
            value.get("usedBackupCode"),
            Some(&serde_json::Value::Bool(true))
        );
    }

    #[test]
    fn generate_response_uses_camel_case() {
        let value = serde_json::to_value(GenerateResponse {
            secret: "S".to_string(),
            otpauth_url: "otpauth://totp/x".to_string(),
            backup_codes: vec![],
        })
        .unwrap();
        assert!(value.get("otpauthUrl").is_some());
        assert!(value.get("backupCodes").is_some());
    }
}
