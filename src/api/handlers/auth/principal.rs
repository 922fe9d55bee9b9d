//! Session guards applied declaratively per flow.
//!
//! `require_session` is the verified-session guard: it resolves a bearer
//! access token into a [`Principal`]. Access tokens are only ever issued to
//! verified accounts, so the check is stateless signature + expiry; no
//! revocation store is consulted (access tokens are not revocable).
//!
//! `require_no_session` is the inverse guard for flows that only make sense
//! for anonymous callers.

use axum::http::HeaderMap;
use uuid::Uuid;

use super::error::ApiError;
use super::state::AuthState;
use super::tokens::{self, TOKEN_TYPE_ACCESS};
use super::utils::extract_bearer_token;

/// Authenticated caller context derived from access-token claims.
#[derive(Clone, Debug)]
pub(super) struct Principal {
    pub(super) account_id: Uuid,
    pub(super) username: String,
}

/// Resolve the bearer access token into a principal, or fail `Unauthorized`.
pub(super) fn require_session(
    headers: &HeaderMap,
    state: &AuthState,
) -> Result<Principal, ApiError> {
    let token = extract_bearer_token(headers).ok_or_else(ApiError::invalid_token)?;
    let claims = tokens::verify(state.config(), &token, TOKEN_TYPE_ACCESS)
        .map_err(|_| ApiError::invalid_token())?;
    Ok(Principal {
        account_id: claims.sub,
        username: claims.username,
    })
}

/// Reject callers that present a still-valid access token.
pub(super) fn require_no_session(headers: &HeaderMap, state: &AuthState) -> Result<(), ApiError> {
    let Some(token) = extract_bearer_token(headers) else {
        return Ok(());
    };
    if tokens::verify(state.config(), &token, TOKEN_TYPE_ACCESS).is_ok() {
        return Err(ApiError::forbidden("You are already authenticated."));
    }
    // A stale or malformed token is treated as no session at all.
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::accounts::Account;
    use super::super::state::AuthConfig;
    use super::super::tokens::mint_access;
    use super::*;
    use axum::http::{HeaderValue, header::AUTHORIZATION};
    use secrecy::SecretString;

    fn state() -> AuthState {
        AuthState::new(AuthConfig::new(
            "https://devsearch.dev".to_string(),
            SecretString::from("test-secret".to_string()),
        ))
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    fn account() -> Account {
        Account {
            id: Uuid::new_v4(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            username: "test-user".to_string(),
            email: "testuser@example.com".to_string(),
            password_hash: String::new(),
            is_verified: true,
            is_active: true,
        }
    }

    #[test]
    fn require_session_resolves_valid_bearer() {
        let state = state();
        let account = account();
        let token = mint_access(state.config(), &account).unwrap();
        let principal = require_session(&bearer(&token), &state).unwrap();
        assert_eq!(principal.account_id, account.id);
        assert_eq!(principal.username, "test-user");
    }

    #[test]
    fn require_session_rejects_missing_or_garbage_tokens() {
        let state = state();
        assert!(require_session(&HeaderMap::new(), &state).is_err());
        assert!(require_session(&bearer("not.a.token"), &state).is_err());
    }

    #[test]
    fn require_no_session_rejects_live_tokens_only() {
        let state = state();
        let token = mint_access(state.config(), &account()).unwrap();
        assert!(require_no_session(&bearer(&token), &state).is_err());
        assert!(require_no_session(&HeaderMap::new(), &state).is_ok());
        assert!(require_no_session(&bearer("not.a.token"), &state).is_ok());
    }
}
