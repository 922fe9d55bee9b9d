//! # DevSearch API (Identity & Session Lifecycle)
//!
//! `devsearch` is the backend for a developer-portfolio product. This crate
//! carries the identity core: registration, OTP-based email verification,
//! credential login, access/refresh token issuance, session revocation, and
//! OTP-based password reset.
//!
//! ## Accounts & Verification
//!
//! Accounts are created unverified and activated by a six-digit one-time
//! code delivered over email. The ledger keeps at most one live code per
//! account; issuing a new code for any reason invalidates the previous one.
//!
//! ## Tokens & Sessions
//!
//! - **Access tokens** are short-lived HS256 JWTs checked by signature and
//!   expiry alone on every request.
//! - **Refresh tokens** are long-lived JWTs whose ids are registered as
//!   outstanding at mint time. Logout blacklists one id; logout-all
//!   blacklists every unexpired id for the account. The blacklist is
//!   consulted on every refresh.
//!
//! ## Notifications
//!
//! Flows enqueue notification rows transactionally; a background worker
//! drains the outbox and hands messages to a pluggable sender. Delivery is
//! best effort and never blocks a request.

pub mod api;
pub mod cli;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
