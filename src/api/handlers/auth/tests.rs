//! Handler-level tests for the auth flows.
//!
//! These exercise every rejection path that resolves before the database is
//! touched, so the lazily-connected pool is never actually used.

use super::accounts::Account;
use super::login::login;
use super::passwords::{change_password, complete_password_reset, request_password_reset};
use super::refresh::refresh;
use super::register::register;
use super::sessions::{logout, logout_all};
use super::state::{AuthConfig, AuthState};
use super::tokens::{mint_access, mint_refresh};
use super::types::{
    LoginRequest, LogoutRequest, PasswordChangeRequest, RefreshRequest, RegisterRequest,
    ResetCompleteRequest, ResetRequestRequest, SendOtpRequest, VerifyEmailRequest,
};
use super::verification::{send_verification_otp, verify_email};
use anyhow::Result;
use axum::Json;
use axum::extract::Extension;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION};
use axum::response::IntoResponse;
use secrecy::SecretString;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use uuid::Uuid;

fn lazy_pool() -> Result<PgPool> {
    Ok(PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?)
}

fn auth_state() -> Arc<AuthState> {
    Arc::new(AuthState::new(AuthConfig::new(
        "https://devsearch.dev".to_string(),
        SecretString::from("test-secret".to_string()),
    )))
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

fn bearer(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    Ok(headers)
}

#[tokio::test]
async fn register_missing_payload() -> Result<()> {
    let response = register(
        HeaderMap::new(),
        Extension(lazy_pool()?),
        Extension(auth_state()),
        None,
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn register_rejects_invalid_fields() -> Result<()> {
    let response = register(
        HeaderMap::new(),
        Extension(lazy_pool()?),
        Extension(auth_state()),
        Some(Json(RegisterRequest {
            first_name: "Two Words".to_string(),
            last_name: "User".to_string(),
            email: "invalid_email".to_string(),
            password: "short".to_string(),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn register_rejects_authenticated_callers() -> Result<()> {
    let state = auth_state();
    let token = mint_access(state.config(), &account())?;
    let response = register(
        bearer(&token)?,
        Extension(lazy_pool()?),
        Extension(state),
        Some(Json(RegisterRequest {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: "testuser@example.com".to_string(),
            password: "strong_password".to_string(),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn login_rejects_malformed_email() -> Result<()> {
    let response = login(
        HeaderMap::new(),
        Extension(lazy_pool()?),
        Extension(auth_state()),
        Some(Json(LoginRequest {
            email: "not-an-email".to_string(),
            password: "whatever".to_string(),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn login_missing_payload() -> Result<()> {
    let response = login(
        HeaderMap::new(),
        Extension(lazy_pool()?),
        Extension(auth_state()),
        None,
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn refresh_rejects_garbage_token() -> Result<()> {
    let response = refresh(
        Extension(lazy_pool()?),
        Extension(auth_state()),
        Some(Json(RefreshRequest {
            refresh: "not.a.token".to_string(),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_rejects_access_token_in_refresh_slot() -> Result<()> {
    let state = auth_state();
    let access = mint_access(state.config(), &account())?;
    let response = refresh(
        Extension(lazy_pool()?),
        Extension(state),
        Some(Json(RefreshRequest { refresh: access })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_requires_bearer_token() -> Result<()> {
    let response = logout(
        HeaderMap::new(),
        Extension(lazy_pool()?),
        Extension(auth_state()),
        Some(Json(LogoutRequest {
            refresh: "whatever".to_string(),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_rejects_refresh_token_as_bearer() -> Result<()> {
    let state = auth_state();
    let minted = mint_refresh(state.config(), &account())?;
    let response = logout(
        bearer(&minted.token)?,
        Extension(lazy_pool()?),
        Extension(state),
        Some(Json(LogoutRequest {
            refresh: minted.token.clone(),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_rejects_garbage_refresh_payload() -> Result<()> {
    let state = auth_state();
    let access = mint_access(state.config(), &account())?;
    let response = logout(
        bearer(&access)?,
        Extension(lazy_pool()?),
        Extension(state),
        Some(Json(LogoutRequest {
            refresh: "not.a.token".to_string(),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logout_all_requires_bearer_token() -> Result<()> {
    let response = logout_all(
        HeaderMap::new(),
        Extension(lazy_pool()?),
        Extension(auth_state()),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn change_password_requires_bearer_token() -> Result<()> {
    let response = change_password(
        HeaderMap::new(),
        Extension(lazy_pool()?),
        Extension(auth_state()),
        Some(Json(PasswordChangeRequest {
            old_password: "old".to_string(),
            new_password: "new_password".to_string(),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn send_verification_otp_missing_payload() -> Result<()> {
    let response = send_verification_otp(Extension(lazy_pool()?), None)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn verify_email_rejects_malformed_email() -> Result<()> {
    let response = verify_email(
        Extension(lazy_pool()?),
        Extension(auth_state()),
        Some(Json(VerifyEmailRequest {
            email: "user".to_string(),
            otp: "123456".to_string(),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn reset_request_missing_payload() -> Result<()> {
    let response = request_password_reset(Extension(lazy_pool()?), None)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn reset_complete_rejects_malformed_email() -> Result<()> {
    let response = complete_password_reset(
        Extension(lazy_pool()?),
        Extension(auth_state()),
        Some(Json(ResetCompleteRequest {
            email: "nope".to_string(),
            otp: "123456".to_string(),
            new_password: "strong_password".to_string(),
        })),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn send_otp_request_round_trips() -> Result<()> {
    let request = SendOtpRequest {
        email: "bob@example.com".to_string(),
    };
    let value = serde_json::to_value(&request)?;
    let decoded: SendOtpRequest = serde_json::from_value(value)?;
    assert_eq!(decoded.email, "bob@example.com");

    let request = ResetRequestRequest {
        email: "bob@example.com".to_string(),
    };
    let value = serde_json::to_value(&request)?;
    let decoded: ResetRequestRequest = serde_json::from_value(value)?;
    assert_eq!(decoded.email, "bob@example.com");
    Ok(())
}
