//! Access and refresh token minting/verification.
//!
//! Tokens are HS256 JWTs signed with the service secret. Claims carry the
//! account id, the username slug, and a `token_type` discriminator so a
//! refresh token can never stand in for an access token or vice versa.
//! Verification is signature + expiry only; revocation lives in
//! [`super::revocation`] and is composed by the flows, not here.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::accounts::Account;
use super::state::AuthConfig;

pub(super) const TOKEN_TYPE_ACCESS: &str = "access";
pub(super) const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Token failures are reported with one undifferentiated message so callers
/// cannot distinguish a bad signature from a stale or revoked token.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TokenError {
    #[error("Token is invalid or expired!")]
    Invalid,
    #[error("Token is invalid or expired!")]
    Expired,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct TokenClaims {
    pub(crate) sub: Uuid,
    pub(crate) username: String,
    pub(crate) token_type: String,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
    pub(crate) jti: Uuid,
}

/// A freshly minted refresh token plus the identifiers the revocation
/// registry needs to track it.
pub(super) struct MintedRefresh {
    pub(super) token: String,
    pub(super) jti: Uuid,
    pub(super) expires_at: DateTime<Utc>,
}

fn sign(config: &AuthConfig, claims: &TokenClaims) -> anyhow::Result<String> {
    let key = EncodingKey::from_secret(config.token_secret().expose_secret().as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|err| anyhow::anyhow!("failed to sign token: {err}"))
}

/// Mint a short-lived access token for an account.
pub(super) fn mint_access(config: &AuthConfig, account: &Account) -> anyhow::Result<String> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: account.id,
        username: account.username.clone(),
        token_type: TOKEN_TYPE_ACCESS.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(config.access_ttl_seconds())).timestamp(),
        jti: Uuid::new_v4(),
    };
    sign(config, &claims)
}

/// Mint a refresh token; the caller records the returned id as outstanding.
pub(super) fn mint_refresh(config: &AuthConfig, account: &Account) -> anyhow::Result<MintedRefresh> {
    let now = Utc::now();
    let expires_at = now + Duration::seconds(config.refresh_ttl_seconds());
    let jti = Uuid::new_v4();
    let claims = TokenClaims {
        sub: account.id,
        username: account.username.clone(),
        token_type: TOKEN_TYPE_REFRESH.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
        jti,
    };
    Ok(MintedRefresh {
        token: sign(config, &claims)?,
        jti,
        expires_at,
    })
}

/// Decode and validate a token of the expected type.
pub(super) fn verify(
    config: &AuthConfig,
    token: &str,
    expected_type: &str,
) -> Result<TokenClaims, TokenError> {
    let key = DecodingKey::from_secret(config.token_secret().expose_secret().as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;

    let data = decode::<TokenClaims>(token, &key, &validation).map_err(|err| {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        }
    })?;

    if data.claims.token_type != expected_type {
        return Err(TokenError::Invalid);
    }
    Ok(data.claims)
}
