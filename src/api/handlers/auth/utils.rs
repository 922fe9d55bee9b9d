//! Small helpers shared by the auth handlers.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use regex::Regex;

/// Normalize an email for lookup/uniqueness checks.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Build the username slug embedded in access-token claims.
pub(super) fn username_slug(first_name: &str, last_name: &str) -> String {
    format!(
        "{}-{}",
        first_name.trim().to_lowercase(),
        last_name.trim().to_lowercase()
    )
}

/// Parse an OTP submission into its numeric form.
///
/// Codes arrive as JSON strings or numbers; anything that is not a six-digit
/// number is treated as an unknown code by the caller, never as a parse error.
pub(super) fn parse_otp(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > 9 {
        return None;
    }
    trimmed.parse::<i32>().ok()
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Pull a bearer token out of the `Authorization` header, if any.
pub(super) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Bob@Example.COM "), "bob@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn username_slug_joins_lowercased_names() {
        assert_eq!(username_slug("Praise", "Idowu"), "praise-idowu");
        assert_eq!(username_slug(" Test ", "User"), "test-user");
    }

    #[test]
    fn parse_otp_accepts_digits_only() {
        assert_eq!(parse_otp("123456"), Some(123_456));
        assert_eq!(parse_otp(" 654321 "), Some(654_321));
        assert_eq!(parse_otp("hgtr"), None);
        assert_eq!(parse_otp(""), None);
        assert_eq!(parse_otp("99999999999999999999"), None);
    }

    #[test]
    fn extract_bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers), Some("abc.def".to_string()));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("abc.def"));
        assert_eq!(extract_bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
