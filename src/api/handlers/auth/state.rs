//! Auth configuration and shared state.

use secrecy::SecretString;

use super::password::PasswordHasher;

const DEFAULT_ACCESS_TTL_SECONDS: i64 = 5 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: i64 = 24 * 60 * 60;
const DEFAULT_OTP_TTL_SECONDS: i64 = 15 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    token_secret: SecretString,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
    otp_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String, token_secret: SecretString) -> Self {
        Self {
            frontend_base_url,
            token_secret,
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_otp_ttl_seconds(mut self, seconds: i64) -> Self {
        self.otp_ttl_seconds = seconds;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(super) fn token_secret(&self) -> &SecretString {
        &self.token_secret
    }

    pub(super) fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    pub(super) fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }

    pub(super) fn otp_ttl_seconds(&self) -> i64 {
        self.otp_ttl_seconds
    }
}

pub struct AuthState {
    config: AuthConfig,
    hasher: PasswordHasher,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            hasher: PasswordHasher::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::new(
            "https://devsearch.dev".to_string(),
            SecretString::from("secret".to_string()),
        )
    }

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = config();
        assert_eq!(config.frontend_base_url(), "https://devsearch.dev");
        assert_eq!(config.access_ttl_seconds(), DEFAULT_ACCESS_TTL_SECONDS);
        assert_eq!(config.refresh_ttl_seconds(), DEFAULT_REFRESH_TTL_SECONDS);
        assert_eq!(config.otp_ttl_seconds(), DEFAULT_OTP_TTL_SECONDS);

        let config = config
            .with_access_ttl_seconds(60)
            .with_refresh_ttl_seconds(120)
            .with_otp_ttl_seconds(30);
        assert_eq!(config.access_ttl_seconds(), 60);
        assert_eq!(config.refresh_ttl_seconds(), 120);
        assert_eq!(config.otp_ttl_seconds(), 30);
    }

    #[test]
    fn auth_state_exposes_config_and_hasher() {
        let state = AuthState::new(config());
        assert_eq!(state.config().access_ttl_seconds(), 300);
        let hash = state.hasher().hash("strong_password").unwrap();
        assert!(state.hasher().verify("strong_password", &hash).unwrap());
    }
}
