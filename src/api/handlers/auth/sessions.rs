//! Session revocation endpoints: logout and logout-all.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;

use super::error::ApiError;
use super::principal::require_session;
use super::revocation;
use super::state::AuthState;
use super::tokens::{self, TOKEN_TYPE_REFRESH};
use super::types::{ErrorResponse, LogoutAllResponse, LogoutRequest, MessageResponse};

/// Blacklist the presented refresh token. Revoking twice is a no-op.
#[utoipa::path(
    post,
    path = "/auth/sessions",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Session revoked", body = MessageResponse),
        (status = 401, description = "Missing/invalid access or refresh token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LogoutRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    require_session(&headers, &auth_state)?;

    let Some(Json(request)) = payload else {
        return Err(ApiError::validation("Missing payload"));
    };

    let claims = tokens::verify(auth_state.config(), &request.refresh, TOKEN_TYPE_REFRESH)
        .map_err(|_| ApiError::invalid_token())?;
    revocation::revoke(&pool, claims.jti)
        .await
        .map_err(ApiError::internal)?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Logout successful.")),
    ))
}

/// Blacklist every outstanding refresh token for the authenticated caller.
#[utoipa::path(
    post,
    path = "/auth/sessions/all",
    responses(
        (status = 200, description = "All sessions revoked", body = LogoutAllResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 500, description = "Revocation failed", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn logout_all(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_session(&headers, &auth_state)?;

    let revoked = revocation::revoke_all(&pool, principal.account_id)
        .await
        .map_err(ApiError::internal)?;

    Ok((StatusCode::OK, Json(LogoutAllResponse::new(revoked))))
}
