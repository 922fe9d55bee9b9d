//! Refresh-token registry and blacklist.
//!
//! Every minted refresh token is recorded as outstanding so bulk revocation
//! can enumerate it later. Revocation inserts the token id into the
//! blacklist; reads are plain lookups consulted on every refresh attempt.
//! Writes are immediately visible to subsequent reads, so no locking is
//! layered on top of the store.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

/// Register a freshly minted refresh token as outstanding for its account.
pub(super) async fn record_outstanding(
    pool: &PgPool,
    jti: Uuid,
    account_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    let query = r"
        INSERT INTO refresh_tokens (jti, account_id, expires_at, created_at)
        VALUES ($1, $2, $3, NOW())
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(jti)
        .bind(account_id)
        .bind(expires_at)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to record outstanding refresh token")?;
    Ok(())
}

/// Blacklist a single token id. Idempotent: revoking twice is a no-op.
pub(super) async fn revoke(pool: &PgPool, jti: Uuid) -> Result<()> {
    let query = r"
        INSERT INTO revoked_tokens (jti, revoked_at)
        VALUES ($1, NOW())
        ON CONFLICT (jti) DO NOTHING
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(jti)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to revoke refresh token")?;
    Ok(())
}

/// Blacklist every outstanding, still-unexpired token id for the account.
/// Returns how many ids were newly blacklisted.
pub(super) async fn revoke_all(pool: &PgPool, account_id: Uuid) -> Result<u64> {
    let query = r"
        INSERT INTO revoked_tokens (jti, revoked_at)
        SELECT jti, NOW()
        FROM refresh_tokens
        WHERE account_id = $1
          AND expires_at > NOW()
        ON CONFLICT (jti) DO NOTHING
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(account_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to revoke account refresh tokens")?;
    Ok(result.rows_affected())
}

/// Blacklist membership check, run on every refresh attempt.
pub(super) async fn is_revoked(pool: &PgPool, jti: Uuid) -> Result<bool> {
    let query = "SELECT 1 FROM revoked_tokens WHERE jti = $1 LIMIT 1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(jti)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to check token revocation")?;
    Ok(row.is_some())
}
