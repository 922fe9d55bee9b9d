//! Registration endpoint.

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

use crate::api::email;

use super::accounts::{self, CreateOutcome, NewAccount};
use super::error::ApiError;
use super::otp;
use super::password::{validate_name, validate_password_strength};
use super::principal::require_no_session;
use super::state::AuthState;
use super::types::{ErrorResponse, RegisterRequest, RegisterResponse};
use super::utils::{normalize_email, username_slug, valid_email};

/// Create an unverified account and queue the verification OTP.
///
/// The account row, the OTP, and the outbox row land in one transaction so a
/// partial registration can never leave a code without an account.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, OTP queued", body = RegisterResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Invalid names, email, or weak password", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    require_no_session(&headers, &auth_state)?;

    let Some(Json(request)) = payload else {
        return Err(ApiError::validation("Missing payload"));
    };

    let mut field_errors = serde_json::Map::new();
    if let Err(message) = validate_name(request.first_name.trim()) {
        field_errors.insert("first_name".to_string(), json!(message));
    }
    if let Err(message) = validate_name(request.last_name.trim()) {
        field_errors.insert("last_name".to_string(), json!(message));
    }
    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        field_errors.insert("email".to_string(), json!("Enter a valid email address."));
    }
    if let Err(message) = validate_password_strength(&request.password) {
        field_errors.insert("password".to_string(), json!(message));
    }
    if !field_errors.is_empty() {
        return Err(ApiError::fields(serde_json::Value::Object(field_errors)));
    }

    let first_name = request.first_name.trim();
    let last_name = request.last_name.trim();
    let password_hash = auth_state
        .hasher()
        .hash(&request.password)
        .map_err(ApiError::internal)?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|err| ApiError::internal(err.into()))?;

    let outcome = accounts::insert_account(
        &mut tx,
        &NewAccount {
            first_name,
            last_name,
            username: &username_slug(first_name, last_name),
            email: &email,
            password_hash: &password_hash,
        },
    )
    .await
    .map_err(ApiError::internal)?;

    let account_id = match outcome {
        CreateOutcome::Created(id) => id,
        CreateOutcome::Conflict => {
            let _ = tx.rollback().await;
            return Err(ApiError::already_exists(
                "An account with this email already exists.",
            ));
        }
    };

    let code = otp::generate_code(&mut thread_rng());
    otp::issue(&mut tx, account_id, code)
        .await
        .map_err(ApiError::internal)?;
    email::enqueue(
        &mut tx,
        &email,
        email::TEMPLATE_VERIFY_OTP,
        email::otp_payload(&format!("{first_name} {last_name}"), &email, code),
    )
    .await
    .map_err(ApiError::internal)?;

    tx.commit()
        .await
        .map_err(|err| ApiError::internal(err.into()))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse::new(
            "OTP sent for email verification.",
            email,
        )),
    ))
}
