//! Request/response types for the auth endpoints.
//!
//! Responses share one envelope: `{status, message, data?}` on success and
//! `{status, message, code, data?}` on failure.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Accept OTP submissions as either a JSON string or a bare number; the
/// handlers decide whether the digits match a live code.
pub(super) fn otp_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OtpField {
        Text(String),
        Number(i64),
    }

    Ok(match OtpField::deserialize(deserializer)? {
        OtpField::Text(text) => text,
        OtpField::Number(number) => number.to_string(),
    })
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SendOtpRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyEmailRequest {
    pub email: String,
    #[serde(deserialize_with = "otp_string_or_number")]
    #[schema(value_type = String)]
    pub otp: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LogoutRequest {
    pub refresh: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct PasswordChangeRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetRequestRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetVerifyRequest {
    pub email: String,
    #[serde(deserialize_with = "otp_string_or_number")]
    #[schema(value_type = String)]
    pub otp: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetCompleteRequest {
    pub email: String,
    #[serde(deserialize_with = "otp_string_or_number")]
    #[schema(value_type = String)]
    pub otp: String,
    pub new_password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

impl MessageResponse {
    pub(super) fn new(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterData {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub status: String,
    pub message: String,
    pub data: RegisterData,
}

impl RegisterResponse {
    pub(super) fn new(message: impl Into<String>, email: String) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: RegisterData { email },
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenPairResponse {
    pub status: String,
    pub message: String,
    pub data: TokenPair,
}

impl TokenPairResponse {
    pub(super) fn new(access: String, refresh: String) -> Self {
        Self {
            status: "success".to_string(),
            message: "Login successful.".to_string(),
            data: TokenPair { access, refresh },
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AccessTokenData {
    pub access: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AccessTokenResponse {
    pub status: String,
    pub message: String,
    pub data: AccessTokenData,
}

impl AccessTokenResponse {
    pub(super) fn new(access: String) -> Self {
        Self {
            status: "success".to_string(),
            message: "Token refreshed successfully.".to_string(),
            data: AccessTokenData { access },
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RevokedData {
    pub revoked: u64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LogoutAllResponse {
    pub status: String,
    pub message: String,
    pub data: RevokedData,
}

impl LogoutAllResponse {
    pub(super) fn new(revoked: u64) -> Self {
        Self {
            status: "success".to_string(),
            message: "All sessions have been logged out.".to_string(),
            data: RevokedData { revoked },
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn register_request_round_trips() -> Result<()> {
        let request = RegisterRequest {
            first_name: "Bob".to_string(),
            last_name: "Builder".to_string(),
            email: "bob@example.com".to_string(),
            password: "strong_password".to_string(),
        };
        let value = serde_json::to_value(&request)?;
        let decoded: RegisterRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.email, "bob@example.com");
        Ok(())
    }

    #[test]
    fn otp_accepts_string_or_number() -> Result<()> {
        let decoded: VerifyEmailRequest =
            serde_json::from_value(json!({"email": "a@b.co", "otp": "123456"}))?;
        assert_eq!(decoded.otp, "123456");

        let decoded: VerifyEmailRequest =
            serde_json::from_value(json!({"email": "a@b.co", "otp": 123456}))?;
        assert_eq!(decoded.otp, "123456");
        Ok(())
    }

    #[test]
    fn success_envelope_has_status_and_message() -> Result<()> {
        let value = serde_json::to_value(MessageResponse::new("OTP sent successfully."))?;
        assert_eq!(value["status"], "success");
        assert_eq!(value["message"], "OTP sent successfully.");
        Ok(())
    }

    #[test]
    fn error_envelope_omits_empty_data() -> Result<()> {
        let value = serde_json::to_value(ErrorResponse {
            status: "failure".to_string(),
            message: "Invalid OTP provided.".to_string(),
            code: "validation_error".to_string(),
            data: None,
        })?;
        assert!(value.get("data").is_none());
        Ok(())
    }

    #[test]
    fn token_pair_response_nests_tokens() -> Result<()> {
        let value = serde_json::to_value(TokenPairResponse::new(
            "access-token".to_string(),
            "refresh-token".to_string(),
        ))?;
        assert_eq!(value["data"]["access"], "access-token");
        assert_eq!(value["data"]["refresh"], "refresh-token");
        Ok(())
    }
}
