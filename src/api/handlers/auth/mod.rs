//! Identity and session lifecycle handlers.
//!
//! This module is the auth core: registration, OTP-based email verification,
//! credential login, access/refresh token issuance, session revocation, and
//! OTP-based password reset.
//!
//! ## Token model
//!
//! Access tokens are short-lived HS256 JWTs verified by signature + expiry
//! only. Refresh tokens are long-lived JWTs whose ids are recorded as
//! outstanding on mint; revocation blacklists ids, and the blacklist is
//! consulted on every refresh. The ledger keeps at most one live OTP per
//! account, shared between the verification and reset flows.

mod accounts;
mod error;
pub(crate) mod login;
mod otp;
mod password;
pub(crate) mod passwords;
mod principal;
pub(crate) mod refresh;
pub(crate) mod register;
mod revocation;
pub(crate) mod sessions;
mod state;
mod tokens;
pub(crate) mod types;
mod utils;
pub(crate) mod verification;

pub use state::{AuthConfig, AuthState};

#[cfg(test)]
mod tests;
