//! Email verification endpoints.
//!
//! State machine: Unregistered -> Unverified (OTP issued, notification
//! queued) -> Verified (OTP consumed). Re-issuing while unverified restarts
//! the window without touching account state. Verifying an account that is
//! already verified answers with a success envelope rather than an error.

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use rand::thread_rng;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::api::email;

use super::accounts;
use super::error::ApiError;
use super::otp::{self, OtpStatus};
use super::state::AuthState;
use super::types::{ErrorResponse, MessageResponse, SendOtpRequest, VerifyEmailRequest};
use super::utils::{normalize_email, parse_otp, valid_email};

/// Issue (or reissue) a verification OTP for an unverified account.
#[utoipa::path(
    post,
    path = "/auth/verification",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "OTP queued, or account already verified", body = MessageResponse),
        (status = 404, description = "Unknown account", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn send_verification_otp(
    pool: Extension<PgPool>,
    payload: Option<Json<SendOtpRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation("Missing payload"));
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(ApiError::validation("Enter a valid email address."));
    }

    let account = accounts::find_by_email(&pool, &email)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("No account is associated with this email."))?;

    if account.is_verified {
        return Ok((
            StatusCode::OK,
            Json(MessageResponse::new("Email address already verified!")),
        ));
    }

    let mut tx = pool
        .begin()
        .await
        .map_err(|err| ApiError::internal(err.into()))?;
    let code = otp::generate_code(&mut thread_rng());
    otp::issue(&mut tx, account.id, code)
        .await
        .map_err(ApiError::internal)?;
    email::enqueue(
        &mut tx,
        &account.email,
        email::TEMPLATE_VERIFY_OTP,
        email::otp_payload(&account.full_name(), &account.email, code),
    )
    .await
    .map_err(ApiError::internal)?;
    tx.commit()
        .await
        .map_err(|err| ApiError::internal(err.into()))?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("OTP sent successfully.")),
    ))
}

/// Consume a verification OTP and flip the account to verified.
#[utoipa::path(
    post,
    path = "/auth/verification/verify",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified (or already verified)", body = MessageResponse),
        (status = 400, description = "Invalid OTP", body = ErrorResponse),
        (status = 404, description = "Unknown account", body = ErrorResponse),
        (status = 410, description = "OTP past its window", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn verify_email(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyEmailRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation("Missing payload"));
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(ApiError::validation("Enter a valid email address."));
    }

    let account = accounts::find_by_email(&pool, &email)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("No account is associated with this email."))?;

    if account.is_verified {
        // Burn any stray code so the single-secret slot is left clean.
        otp::consume(&pool, account.id)
            .await
            .map_err(ApiError::internal)?;
        return Ok((
            StatusCode::OK,
            Json(MessageResponse::new("Email address already verified!")),
        ));
    }

    let code = parse_otp(&request.otp)
        .ok_or_else(|| ApiError::bad_request("Invalid OTP provided."))?;
    match otp::validate(
        &pool,
        account.id,
        code,
        auth_state.config().otp_ttl_seconds(),
    )
    .await
    .map_err(ApiError::internal)?
    {
        OtpStatus::Unknown => {
            return Err(ApiError::bad_request("Invalid OTP provided."));
        }
        OtpStatus::Expired => {
            return Err(ApiError::expired("OTP has expired.").with_data(json!({
                "next_action": "request_new_otp",
            })));
        }
        OtpStatus::Valid => {}
    }

    otp::consume(&pool, account.id)
        .await
        .map_err(ApiError::internal)?;
    accounts::mark_verified(&pool, account.id)
        .await
        .map_err(ApiError::internal)?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|err| ApiError::internal(err.into()))?;
    email::enqueue(
        &mut tx,
        &account.email,
        email::TEMPLATE_WELCOME,
        email::notice_payload(&account.full_name(), &account.email),
    )
    .await
    .map_err(ApiError::internal)?;
    tx.commit()
        .await
        .map_err(|err| ApiError::internal(err.into()))?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Email verified successfully.")),
    ))
}
