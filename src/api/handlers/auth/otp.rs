//! One-time code ledger.
//!
//! At most one live code exists per account: issuing deletes every prior row
//! for that account before inserting the new one, inside the caller's
//! transaction. Under concurrent issuance the last write wins, which is the
//! intended single-secret behavior. Codes are purpose-agnostic, so a reset
//! code supersedes a pending verification code and vice versa.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::Instrument;
use uuid::Uuid;

pub(super) const OTP_MIN: i32 = 100_000;
pub(super) const OTP_MAX: i32 = 999_999;

/// Result of checking a submitted code against the ledger.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum OtpStatus {
    Valid,
    Unknown,
    Expired,
}

/// Draw a uniformly random six-digit code from the supplied source.
///
/// The randomness source is injected so tests can assert exact codes from a
/// seeded generator.
pub(super) fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(OTP_MIN..=OTP_MAX)
}

/// Wall-clock window check, evaluated at validation time only.
pub(super) fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>, ttl_seconds: i64) -> bool {
    now.signed_duration_since(created_at).num_seconds() > ttl_seconds
}

/// Store a new code for the account, superseding any previous one.
pub(super) async fn issue(
    tx: &mut Transaction<'_, Postgres>,
    account_id: Uuid,
    code: i32,
) -> Result<()> {
    let query = "DELETE FROM otps WHERE account_id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(account_id)
        .execute(&mut **tx)
        .instrument(span)
        .await
        .context("failed to delete previous otps")?;

    let query = r"
        INSERT INTO otps (account_id, code, created_at)
        VALUES ($1, $2, NOW())
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(account_id)
        .bind(code)
        .execute(&mut **tx)
        .instrument(span)
        .await
        .context("failed to insert otp")?;
    Ok(())
}

/// Check a code without consuming it; consumption is a separate step so the
/// reset flow can verify first and burn the code on completion.
pub(super) async fn validate(
    pool: &PgPool,
    account_id: Uuid,
    code: i32,
    ttl_seconds: i64,
) -> Result<OtpStatus> {
    let query = r"
        SELECT created_at
        FROM otps
        WHERE account_id = $1
          AND code = $2
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(account_id)
        .bind(code)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup otp")?;

    let Some(row) = row else {
        return Ok(OtpStatus::Unknown);
    };

    let created_at: DateTime<Utc> = row.get("created_at");
    if is_expired(created_at, Utc::now(), ttl_seconds) {
        return Ok(OtpStatus::Expired);
    }
    Ok(OtpStatus::Valid)
}

/// Burn every code for the account so each one is single-use.
pub(super) async fn consume(pool: &PgPool, account_id: Uuid) -> Result<()> {
    let query = "DELETE FROM otps WHERE account_id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(account_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to consume otps")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generated_codes_stay_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let code = generate_code(&mut rng);
            assert!((OTP_MIN..=OTP_MAX).contains(&code));
        }
    }

    #[test]
    fn seeded_generator_is_deterministic() {
        let first = generate_code(&mut StdRng::seed_from_u64(42));
        let second = generate_code(&mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);

        let third = generate_code(&mut StdRng::seed_from_u64(43));
        let fourth = generate_code(&mut StdRng::seed_from_u64(42));
        assert_eq!(second, fourth);
        assert!((OTP_MIN..=OTP_MAX).contains(&third));
    }

    #[test]
    fn window_is_measured_from_creation() {
        let created = Utc::now();
        let window = 15 * 60;
        assert!(!is_expired(created, created + Duration::minutes(14), window));
        assert!(!is_expired(created, created + Duration::minutes(15), window));
        assert!(is_expired(created, created + Duration::minutes(16), window));
    }

    #[test]
    fn otp_status_distinguishes_unknown_and_expired() {
        assert_ne!(OtpStatus::Unknown, OtpStatus::Expired);
        assert_ne!(OtpStatus::Valid, OtpStatus::Unknown);
    }
}
