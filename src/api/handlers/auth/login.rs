//! Credential login endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use super::accounts;
use super::error::ApiError;
use super::principal::require_no_session;
use super::revocation;
use super::state::AuthState;
use super::tokens;
use super::types::{ErrorResponse, LoginRequest, TokenPairResponse};
use super::utils::{normalize_email, valid_email};

/// Exchange email + password for an access/refresh token pair.
///
/// Order of checks: unknown account, unverified email, disabled account,
/// wrong password. Each issued refresh token is recorded as outstanding so
/// logout-all can find it later. Two logins yield two independently valid
/// pairs; there is no single-session enforcement.
#[utoipa::path(
    post,
    path = "/auth/token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenPairResponse),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 403, description = "Unverified email or disabled account", body = ErrorResponse),
        (status = 404, description = "Unknown account", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    require_no_session(&headers, &auth_state)?;

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

    if !account.is_verified {
        return Err(ApiError::forbidden(
            "Email not verified. Please verify your email before logging in.",
        )
        .with_data(json!({
            "next_action": "send_otp",
            "email": account.email,
        })));
    }

    if !account.is_active {
        return Err(ApiError::forbidden("This account has been disabled."));
    }

    let password_matches = auth_state
        .hasher()
        .verify(&request.password, &account.password_hash)
        .map_err(ApiError::internal)?;
    if !password_matches {
        return Err(ApiError::unauthorized("Invalid credentials."));
    }

    let access = tokens::mint_access(auth_state.config(), &account).map_err(ApiError::internal)?;
    let refresh =
        tokens::mint_refresh(auth_state.config(), &account).map_err(ApiError::internal)?;
    revocation::record_outstanding(&pool, refresh.jti, account.id, refresh.expires_at)
        .await
        .map_err(ApiError::internal)?;

    Ok((
        StatusCode::OK,
        Json(TokenPairResponse::new(access, refresh.token)),
    ))
}
