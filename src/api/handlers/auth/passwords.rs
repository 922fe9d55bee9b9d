//! Password change and OTP-based reset endpoints.
//!
//! Reset state machine: Idle -> OtpIssued -> OtpVerified -> Idle. The ledger
//! keeps one purpose-agnostic code per account, so requesting a reset
//! supersedes any pending verification code. The verify step checks without
//! consuming; completion validates again, burns the code, and replaces the
//! hash.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use rand::thread_rng;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::email;

use super::accounts::{self, Account};
use super::error::ApiError;
use super::otp::{self, OtpStatus};
use super::password::validate_password_strength;
use super::principal::require_session;
use super::state::AuthState;
use super::types::{
    ErrorResponse, MessageResponse, PasswordChangeRequest, ResetCompleteRequest,
    ResetRequestRequest, ResetVerifyRequest,
};
use super::utils::{normalize_email, parse_otp, valid_email};

/// Change the password of the authenticated caller.
///
/// Other outstanding sessions stay valid; only the credential changes.
#[utoipa::path(
    post,
    path = "/auth/passwords/change",
    request_body = PasswordChangeRequest,
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 401, description = "Missing token or wrong old password", body = ErrorResponse),
        (status = 422, description = "Weak new password", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn change_password(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<PasswordChangeRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_session(&headers, &auth_state)?;

    let Some(Json(request)) = payload else {
        return Err(ApiError::validation("Missing payload"));
    };

    let account = accounts::find_by_id(&pool, principal.account_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(ApiError::invalid_token)?;

    let old_matches = auth_state
        .hasher()
        .verify(&request.old_password, &account.password_hash)
        .map_err(ApiError::internal)?;
    if !old_matches {
        return Err(ApiError::unauthorized("Old password is incorrect."));
    }

    if let Err(message) = validate_password_strength(&request.new_password) {
        return Err(ApiError::fields(json!({ "new_password": message })));
    }

    replace_password(&pool, &auth_state, account.id, &request.new_password).await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Password changed successfully.")),
    ))
}

/// Issue a password-reset OTP, superseding any outstanding code.
#[utoipa::path(
    post,
    path = "/auth/passwords/reset",
    request_body = ResetRequestRequest,
    responses(
        (status = 200, description = "Reset OTP queued", body = MessageResponse),
        (status = 404, description = "Unknown account", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn request_password_reset(
    pool: Extension<PgPool>,
    payload: Option<Json<ResetRequestRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation("Missing payload"));
    };

    let account = lookup_account(&pool, &request.email).await?;

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
        email::TEMPLATE_PASSWORD_RESET_OTP,
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

/// Check a reset OTP without consuming it.
#[utoipa::path(
    post,
    path = "/auth/passwords/reset/verify",
    request_body = ResetVerifyRequest,
    responses(
        (status = 200, description = "OTP valid", body = MessageResponse),
        (status = 400, description = "Invalid OTP", body = ErrorResponse),
        (status = 404, description = "Unknown account", body = ErrorResponse),
        (status = 410, description = "OTP past its window", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn verify_password_reset(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResetVerifyRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation("Missing payload"));
    };

    let account = lookup_account(&pool, &request.email).await?;
    check_otp(&pool, &auth_state, account.id, &request.otp).await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("OTP verified successfully.")),
    ))
}

/// Validate the OTP, burn it, and set the new password.
#[utoipa::path(
    post,
    path = "/auth/passwords/reset/complete",
    request_body = ResetCompleteRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid OTP", body = ErrorResponse),
        (status = 404, description = "Unknown account", body = ErrorResponse),
        (status = 410, description = "OTP past its window", body = ErrorResponse),
        (status = 422, description = "Weak new password", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn complete_password_reset(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResetCompleteRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation("Missing payload"));
    };

    let account = lookup_account(&pool, &request.email).await?;
    check_otp(&pool, &auth_state, account.id, &request.otp).await?;

    // Strength is checked before the code is burned so a weak password does
    // not cost the caller their OTP.
    if let Err(message) = validate_password_strength(&request.new_password) {
        return Err(ApiError::fields(json!({ "new_password": message })));
    }

    otp::consume(&pool, account.id)
        .await
        .map_err(ApiError::internal)?;
    replace_password(&pool, &auth_state, account.id, &request.new_password).await?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|err| ApiError::internal(err.into()))?;
    email::enqueue(
        &mut tx,
        &account.email,
        email::TEMPLATE_PASSWORD_RESET_SUCCESS,
        email::notice_payload(&account.full_name(), &account.email),
    )
    .await
    .map_err(ApiError::internal)?;
    tx.commit()
        .await
        .map_err(|err| ApiError::internal(err.into()))?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Password reset successful.")),
    ))
}

async fn lookup_account(pool: &PgPool, email: &str) -> Result<Account, ApiError> {
    let email = normalize_email(email);
    if !valid_email(&email) {
        return Err(ApiError::validation("Enter a valid email address."));
    }
    accounts::find_by_email(pool, &email)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("No account is associated with this email."))
}

async fn check_otp(
    pool: &PgPool,
    auth_state: &AuthState,
    account_id: Uuid,
    raw_otp: &str,
) -> Result<(), ApiError> {
    let code = parse_otp(raw_otp).ok_or_else(|| ApiError::bad_request("Invalid OTP provided."))?;
    match otp::validate(pool, account_id, code, auth_state.config().otp_ttl_seconds())
        .await
        .map_err(ApiError::internal)?
    {
        OtpStatus::Unknown => Err(ApiError::bad_request("Invalid OTP provided.")),
        OtpStatus::Expired => Err(ApiError::expired(
            "OTP has expired. Please request a new one.",
        )),
        OtpStatus::Valid => Ok(()),
    }
}

async fn replace_password(
    pool: &PgPool,
    auth_state: &AuthState,
    account_id: Uuid,
    new_password: &str,
) -> Result<(), ApiError> {
    let password_hash = auth_state
        .hasher()
        .hash(new_password)
        .map_err(ApiError::internal)?;
    accounts::set_password(pool, account_id, &password_hash)
        .await
        .map_err(ApiError::internal)
}
