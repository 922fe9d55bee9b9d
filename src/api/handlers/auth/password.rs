//! Password hashing and strength/name policies.
//!
//! Hashing uses Argon2id with OWASP-recommended parameters. The stored hash
//! is PHC-formatted and only ever compared, never read back out.

use anyhow::{Result, anyhow};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

pub(super) const PASSWORD_MIN_LENGTH: usize = 8;
const NAME_MAX_LENGTH: usize = 50;

/// Argon2id hasher carrying fixed parameters (m=19456 KiB, t=2, p=1).
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    #[must_use]
    pub fn new() -> Self {
        // OWASP 2024 parameters; constants are always valid so the expect is
        // unreachable outside an argon2 bug.
        #[allow(clippy::expect_used)]
        let params =
            Params::new(19_456, 2, 1, None).expect("Argon2 parameters are valid constants");
        Self { params }
    }

    /// Hash a plaintext password into a PHC string.
    ///
    /// # Errors
    /// Returns an error if the underlying hash computation fails.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| anyhow!("failed to hash password: {err}"))?;
        Ok(hash.to_string())
    }

    /// Compare a candidate password against a stored hash.
    ///
    /// # Errors
    /// Returns an error only when the stored hash is malformed; a wrong
    /// password is `Ok(false)`.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|err| anyhow!("invalid password hash: {err}"))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(anyhow!("failed to verify password: {err}")),
        }
    }
}

/// Minimum length plus composition: fully numeric passwords are rejected.
pub(super) fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.len() < PASSWORD_MIN_LENGTH {
        return Err(format!(
            "Password must be at least {PASSWORD_MIN_LENGTH} characters long."
        ));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("Password cannot be entirely numeric.".to_string());
    }
    Ok(())
}

/// Name parts are single alphabetic tokens.
pub(super) fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    if name.len() > NAME_MAX_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {NAME_MAX_LENGTH} characters."
        ));
    }
    if name.split_whitespace().count() > 1 {
        return Err("No spacing allowed.".to_string());
    }
    if !name.chars().all(char::is_alphabetic) {
        return Err("Only alphabetic characters are allowed.".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("strong_password").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("strong_password", &hash).unwrap());
        assert!(!hasher.verify("wrong_password", &hash).unwrap());
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        let hasher = PasswordHasher::new();
        assert!(hasher.verify("whatever", "not-a-phc-hash").is_err());
    }

    #[test]
    fn strength_enforces_length_and_composition() {
        assert!(validate_password_strength("strong_password").is_ok());
        assert!(validate_password_strength("short").is_err());
        assert!(validate_password_strength("12345678").is_err());
        assert!(validate_password_strength("pass1234").is_ok());
    }

    #[test]
    fn names_are_single_alphabetic_tokens() {
        assert!(validate_name("Praise").is_ok());
        assert!(validate_name("Two Words").is_err());
        assert!(validate_name("d4ve").is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"a".repeat(51)).is_err());
    }
}
