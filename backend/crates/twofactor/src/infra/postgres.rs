//! PostgreSQL Repository Implementations
//!
//! The race-sensitive operations are single conditional statements
//! (`rows_affected` tells the caller whether the condition held) or single
//! transactions, per the concurrency guarantees the domain traits require.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    account::Account, pending_secret::PendingSecret, two_factor::TwoFactor,
};
use crate::domain::repository::{AccountRepository, BackupCodeRepository, TwoFactorRepository};
use crate::domain::value_object::{account_id::AccountId, totp_secret::TotpSecret};
use crate::error::{TwoFactorError, TwoFactorResult};

/// PostgreSQL-backed two-factor repository
#[derive(Clone)]
pub struct PgTwoFactorRepository {
    pool: PgPool,
}

impl PgTwoFactorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Discard pending setups older than the given cutoff
    ///
    /// Abandoned wizards leave a pending row behind; a startup sweep keeps
    /// the table from accumulating them.
    pub async fn cleanup_stale_pending(&self, cutoff: DateTime<Utc>) -> TwoFactorResult<u64> {
        let deleted = sqlx::query("DELETE FROM two_factor_pending WHERE issued_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(
            pending_deleted = deleted,
            "Cleaned up stale pending two-factor setups"
        );

        Ok(deleted)
    }
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgTwoFactorRepository {
    async fn find_account(&self, account_id: &AccountId) -> TwoFactorResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                label,
                password_hash
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }
}

// ============================================================================
// Two-Factor Repository Implementation
// ============================================================================

impl TwoFactorRepository for PgTwoFactorRepository {
    async fn find(&self, account_id: &AccountId) -> TwoFactorResult<Option<TwoFactor>> {
        let row = sqlx::query_as::<_, TwoFactorRow>(
            r#"
            SELECT
                account_id,
                totp_secret,
                enabled,
                last_used_step,
                created_at,
                updated_at
            FROM two_factor
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_two_factor()).transpose()
    }

    async fn start_setup(&self, pending: &PendingSecret) -> TwoFactorResult<()> {
        // Latest write wins: at most one pending secret per account
        sqlx::query(
            r#"
            INSERT INTO two_factor_pending (account_id, totp_secret, issued_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (account_id)
            DO UPDATE SET totp_secret = $2, issued_at = $3
            "#,
        )
        .bind(pending.account_id.as_uuid())
        .bind(pending.secret.as_base32())
        .bind(pending.issued_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_pending(
        &self,
        account_id: &AccountId,
    ) -> TwoFactorResult<Option<PendingSecret>> {
        let row = sqlx::query_as::<_, PendingRow>(
            r#"
            SELECT account_id, totp_secret, issued_at
            FROM two_factor_pending
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_pending()).transpose()
    }

    async fn promote_pending(
        &self,
        account_id: &AccountId,
        expected_secret: &str,
        consumed_step: i64,
        code_digests: &[String],
    ) -> TwoFactorResult<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // The pending row must still hold the secret the caller verified;
        // zero rows means a concurrent "start setup" superseded it
        let deleted = sqlx::query(
            "DELETE FROM two_factor_pending WHERE account_id = $1 AND totp_secret = $2",
        )
        .bind(account_id.as_uuid())
        .bind(expected_secret)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO two_factor (
                account_id,
                totp_secret,
                enabled,
                last_used_step,
                created_at,
                updated_at
            ) VALUES ($1, $2, TRUE, $3, $4, $4)
            ON CONFLICT (account_id)
            DO UPDATE SET
                totp_secret = $2,
                enabled = TRUE,
                last_used_step = $3,
                updated_at = $4
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(expected_secret)
        .bind(consumed_step)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // Replace any stale codes from an earlier enablement
        sqlx::query("DELETE FROM backup_codes WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        for digest in code_digests {
            sqlx::query(
                r#"
                INSERT INTO backup_codes (account_id, code_digest, used, used_at, created_at)
                VALUES ($1, $2, FALSE, NULL, $3)
                "#,
            )
            .bind(account_id.as_uuid())
            .bind(digest)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(true)
    }

    async fn disable(&self, account_id: &AccountId) -> TwoFactorResult<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE two_factor SET
                totp_secret = NULL,
                enabled = FALSE,
                last_used_step = NULL,
                updated_at = $2
            WHERE account_id = $1 AND enabled
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM backup_codes WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM two_factor_pending WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn claim_step(&self, account_id: &AccountId, step: i64) -> TwoFactorResult<bool> {
        // Conditional update: succeeds only for a strictly newer step, so the
        // same step can never be consumed twice
        let updated = sqlx::query(
            r#"
            UPDATE two_factor SET
                last_used_step = $2,
                updated_at = $3
            WHERE account_id = $1
              AND enabled
              AND (last_used_step IS NULL OR last_used_step < $2)
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(step)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }
}

// ============================================================================
// Backup Code Repository Implementation
// ============================================================================

impl BackupCodeRepository for PgTwoFactorRepository {
    async fn consume(&self, account_id: &AccountId, digest: &str) -> TwoFactorResult<bool> {
        // Single conditional update: two concurrent submissions of the same
        // code cannot both see used = FALSE
        let updated = sqlx::query(
            r#"
            UPDATE backup_codes SET
                used = TRUE,
                used_at = $3
            WHERE account_id = $1 AND code_digest = $2 AND used = FALSE
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(digest)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn replace_all(
        &self,
        account_id: &AccountId,
        digests: &[String],
    ) -> TwoFactorResult<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Lock the state row and re-check enabled inside the transaction;
        // a disable landing first must win and leave zero codes behind
        let enabled = sqlx::query_scalar::<_, bool>(
            "SELECT enabled FROM two_factor WHERE account_id = $1 FOR UPDATE",
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(false);

        if !enabled {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM backup_codes WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        for digest in digests {
            sqlx::query(
                r#"
                INSERT INTO backup_codes (account_id, code_digest, used, used_at, created_at)
                VALUES ($1, $2, FALSE, NULL, $3)
                "#,
            )
            .bind(account_id.as_uuid())
            .bind(digest)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(true)
    }

    async fn unused_count(&self, account_id: &AccountId) -> TwoFactorResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM backup_codes WHERE account_id = $1 AND used = FALSE",
        )
        .bind(account_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    label: String,
    password_hash: String,
}

impl AccountRow {
    fn into_account(self) -> TwoFactorResult<Account> {
        let password_hash = platform::password::HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| TwoFactorError::Internal(format!("Invalid stored hash: {}", e)))?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            label: self.label,
            password_hash,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TwoFactorRow {
    account_id: Uuid,
    totp_secret: Option<String>,
    enabled: bool,
    last_used_step: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TwoFactorRow {
    fn into_two_factor(self) -> TwoFactorResult<TwoFactor> {
        let secret = self
            .totp_secret
            .map(TotpSecret::from_base32)
            .transpose()
            .map_err(|e| TwoFactorError::Internal(e.to_string()))?;

        Ok(TwoFactor {
            account_id: AccountId::from_uuid(self.account_id),
            enabled: self.enabled,
            secret,
            last_used_step: self.last_used_step,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PendingRow {
    account_id: Uuid,
    totp_secret: String,
    issued_at: DateTime<Utc>,
}

impl PendingRow {
    fn into_pending(self) -> TwoFactorResult<PendingSecret> {
        let secret = TotpSecret::from_base32(self.totp_secret)
            .map_err(|e| TwoFactorError::Internal(e.to_string()))?;

        Ok(PendingSecret {
            account_id: AccountId::from_uuid(self.account_id),
            secret,
            issued_at: self.issued_at,
        })
    }
}
