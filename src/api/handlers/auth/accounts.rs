//! Database helpers for account records.
//!
//! The password hash column is write/compare only: it is fetched into
//! [`Account`] for verification and never serialized outward.

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::Instrument;
use uuid::Uuid;

use super::utils::is_unique_violation;

/// Outcome when attempting to create a new account.
#[derive(Debug)]
pub(super) enum CreateOutcome {
    Created(Uuid),
    Conflict,
}

pub(crate) struct Account {
    pub(crate) id: Uuid,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) is_verified: bool,
    pub(crate) is_active: bool,
}

impl Account {
    pub(super) fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

pub(super) struct NewAccount<'a> {
    pub(super) first_name: &'a str,
    pub(super) last_name: &'a str,
    pub(super) username: &'a str,
    pub(super) email: &'a str,
    pub(super) password_hash: &'a str,
}

/// Insert a fresh unverified, active account.
///
/// Duplicate emails surface as [`CreateOutcome::Conflict`] rather than an
/// error so the handler can answer without leaking the SQLSTATE.
pub(super) async fn insert_account(
    tx: &mut Transaction<'_, Postgres>,
    account: &NewAccount<'_>,
) -> Result<CreateOutcome> {
    let query = r"
        INSERT INTO accounts
            (first_name, last_name, username, email, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(account.first_name)
        .bind(account.last_name)
        .bind(account.username)
        .bind(account.email)
        .bind(account.password_hash)
        .fetch_one(&mut **tx)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(CreateOutcome::Created(row.get("id"))),
        Err(err) if is_unique_violation(&err) => Ok(CreateOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert account"),
    }
}

pub(super) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>> {
    let query = r"
        SELECT id, first_name, last_name, username, email, password_hash,
               is_verified, is_active
        FROM accounts
        WHERE email = $1
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup account by email")?;
    Ok(row.map(account_from_row))
}

pub(super) async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Account>> {
    let query = r"
        SELECT id, first_name, last_name, username, email, password_hash,
               is_verified, is_active
        FROM accounts
        WHERE id = $1
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup account by id")?;
    Ok(row.map(account_from_row))
}

/// Replace the stored password hash. Strength policy is the caller's job;
/// this only persists an already-computed hash.
pub(super) async fn set_password(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<()> {
    let query = r"
        UPDATE accounts
        SET password_hash = $2,
            updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update password hash")?;
    Ok(())
}

/// Flip `is_verified` on. Idempotent: verifying an already-verified account
/// is a no-op, not an error.
pub(super) async fn mark_verified(pool: &PgPool, id: Uuid) -> Result<()> {
    let query = r"
        UPDATE accounts
        SET is_verified = TRUE,
            updated_at = NOW()
        WHERE id = $1
          AND is_verified = FALSE
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to mark account verified")?;
    Ok(())
}

fn account_from_row(row: sqlx::postgres::PgRow) -> Account {
    Account {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        is_verified: row.get("is_verified"),
        is_active: row.get("is_active"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_outcome_debug_names() {
        assert!(format!("{:?}", CreateOutcome::Created(Uuid::nil())).starts_with("Created"));
        assert_eq!(format!("{:?}", CreateOutcome::Conflict), "Conflict");
    }

    #[test]
    fn full_name_joins_name_parts() {
        let account = Account {
            id: Uuid::nil(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            username: "test-user".to_string(),
            email: "testuser@example.com".to_string(),
            password_hash: String::new(),
            is_verified: false,
            is_active: true,
        };
        assert_eq!(account.full_name(), "Test User");
    }
}
