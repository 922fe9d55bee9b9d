//! Typed API failures and their JSON envelope rendering.
//!
//! Business-rule failures are raised as [`ApiError`] values and translated
//! into the uniform failure envelope `{status, message, code, data?}`.
//! Anything unanticipated collapses into a generic server error so internal
//! detail never reaches the wire.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use super::types::ErrorResponse;

/// Machine-readable error codes carried in the failure envelope.
mod code {
    pub(super) const VALIDATION_ERROR: &str = "validation_error";
    pub(super) const NON_EXISTENT: &str = "non_existent";
    pub(super) const EXPIRED: &str = "expired";
    pub(super) const UNAUTHORIZED: &str = "unauthorized";
    pub(super) const FORBIDDEN: &str = "forbidden";
    pub(super) const ALREADY_EXISTS: &str = "already_exists";
    pub(super) const INVALID_TOKEN: &str = "invalid_token";
    pub(super) const SERVER_ERROR: &str = "server_error";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Validation,
    BadRequest,
    NotFound,
    Expired,
    Unauthorized,
    Forbidden,
    AlreadyExists,
    InvalidToken,
    Server,
}

impl Kind {
    const fn status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Expired => StatusCode::GONE,
            Self::Unauthorized | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::Server => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn code(self) -> &'static str {
        match self {
            Self::Validation | Self::BadRequest => code::VALIDATION_ERROR,
            Self::NotFound => code::NON_EXISTENT,
            Self::Expired => code::EXPIRED,
            Self::Unauthorized => code::UNAUTHORIZED,
            Self::Forbidden => code::FORBIDDEN,
            Self::AlreadyExists => code::ALREADY_EXISTS,
            Self::InvalidToken => code::INVALID_TOKEN,
            Self::Server => code::SERVER_ERROR,
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    kind: Kind,
    message: String,
    data: Option<serde_json::Value>,
}

impl ApiError {
    fn new(kind: Kind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
        }
    }

    pub(super) fn validation(message: impl Into<String>) -> Self {
        Self::new(Kind::Validation, message)
    }

    /// Field-level validation detail; the field map rides in the envelope's
    /// `data` member.
    pub(super) fn fields(errors: serde_json::Value) -> Self {
        Self::new(Kind::Validation, "Invalid entry.").with_data(errors)
    }

    /// Malformed submissions that the endpoint table reports as plain 400s
    /// (an OTP that matches no record, for example).
    pub(super) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Kind::BadRequest, message)
    }

    pub(super) fn not_found(message: impl Into<String>) -> Self {
        Self::new(Kind::NotFound, message)
    }

    pub(super) fn expired(message: impl Into<String>) -> Self {
        Self::new(Kind::Expired, message)
    }

    pub(super) fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(Kind::Unauthorized, message)
    }

    pub(super) fn forbidden(message: impl Into<String>) -> Self {
        Self::new(Kind::Forbidden, message)
    }

    pub(super) fn already_exists(message: impl Into<String>) -> Self {
        Self::new(Kind::AlreadyExists, message)
    }

    /// Missing, malformed, expired, and revoked tokens all share one message
    /// so callers cannot tell which condition applied.
    pub(super) fn invalid_token() -> Self {
        Self::new(Kind::InvalidToken, "Token is invalid or expired!")
    }

    pub(super) fn server() -> Self {
        Self::new(Kind::Server, "Something went wrong on our end.")
    }

    /// Log an internal failure and hide it behind the generic server error.
    pub(super) fn internal(err: anyhow::Error) -> Self {
        error!("internal error: {err:#}");
        Self::server()
    }

    #[must_use]
    pub(super) fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    #[cfg(test)]
    pub(super) fn status(&self) -> StatusCode {
        self.kind.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: "failure".to_string(),
            message: self.message,
            code: self.kind.code().to_string(),
            data: self.data,
        };
        (self.kind.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kinds_map_to_statuses_and_codes() {
        assert_eq!(
            ApiError::validation("bad").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::bad_request("bad otp").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::not_found("nope").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::expired("late").status(), StatusCode::GONE);
        assert_eq!(
            ApiError::unauthorized("who").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::forbidden("no").status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::already_exists("dup").status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::invalid_token().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::server().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn envelope_carries_code_and_optional_data() {
        let response = ApiError::forbidden("Email not verified.")
            .with_data(json!({"next_action": "send_otp"}))
            .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = ApiError::invalid_token().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn field_errors_use_the_validation_kind() {
        let err = ApiError::fields(json!({"first_name": "No spacing allowed."}));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "Invalid entry.");
    }
}
