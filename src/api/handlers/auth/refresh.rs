//! Access-token refresh endpoint.

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;

use super::accounts;
use super::error::ApiError;
use super::revocation;
use super::state::AuthState;
use super::tokens::{self, TOKEN_TYPE_REFRESH};
use super::types::{AccessTokenResponse, ErrorResponse, RefreshRequest};

/// Mint a new access token from a still-valid refresh token.
///
/// The refresh token itself is not rotated. A blacklisted token id never
/// mints again, even before its natural expiry; all failure modes share one
/// response so callers cannot probe which applied.
#[utoipa::path(
    post,
    path = "/auth/token/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token issued", body = AccessTokenResponse),
        (status = 401, description = "Invalid, expired, or revoked refresh token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::validation("Missing payload"));
    };

    let claims = tokens::verify(auth_state.config(), &request.refresh, TOKEN_TYPE_REFRESH)
        .map_err(|_| ApiError::invalid_token())?;

    if revocation::is_revoked(&pool, claims.jti)
        .await
        .map_err(ApiError::internal)?
    {
        return Err(ApiError::invalid_token());
    }

    let account = accounts::find_by_id(&pool, claims.sub)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(ApiError::invalid_token)?;
    if !account.is_active {
        return Err(ApiError::invalid_token());
    }

    let access = tokens::mint_access(auth_state.config(), &account).map_err(ApiError::internal)?;

    Ok((StatusCode::OK, Json(AccessTokenResponse::new(access))))
}
