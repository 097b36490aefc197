//! PostgreSQL store
//!
//! Implements the account store, ledger log, and atomic commit on one
//! connection pool. The commit runs the conditional versioned UPDATE and the
//! entry INSERT inside a single database transaction, so a version conflict
//! rolls back with nothing visible.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Account, Balance, EntryDraft, EntryKind, LedgerEntry, NewAccount};

use super::{AccountStore, EntryLimit, LedgerCommit, LedgerLog, StoreError};

type AccountRow = (
    Uuid,
    Uuid,
    String,
    i64,
    String,
    bool,
    i64,
    DateTime<Utc>,
    DateTime<Utc>,
);

type EntryRow = (i64, Uuid, Uuid, String, i64, i64, String, DateTime<Utc>);

/// Ledger persistence over PostgreSQL
#[derive(Debug, Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    /// Create a new store with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn account_from_row(row: AccountRow) -> Result<Account, StoreError> {
        let (id, owner_id, name, balance, currency, active, version, created_at, updated_at) = row;

        let balance = Balance::new(balance).map_err(|e| {
            StoreError::InvalidState(format!("account {id} has invalid balance: {e}"))
        })?;

        Ok(Account::from_stored(
            id, owner_id, name, balance, currency, active, version, created_at, updated_at,
        ))
    }

    fn entry_from_row(row: EntryRow) -> Result<LedgerEntry, StoreError> {
        let (id, account_id, owner_id, kind, amount, balance_after, description, created_at) = row;

        let kind: EntryKind = kind
            .parse()
            .map_err(|e| StoreError::InvalidState(format!("entry {id} has invalid kind: {e}")))?;
        let amount = crate::domain::Amount::new(amount).map_err(|e| {
            StoreError::InvalidState(format!("entry {id} has invalid amount: {e}"))
        })?;
        let balance_after = Balance::new(balance_after).map_err(|e| {
            StoreError::InvalidState(format!("entry {id} has invalid balance_after: {e}"))
        })?;

        Ok(LedgerEntry {
            id,
            account_id,
            owner_id,
            kind,
            amount,
            balance_after,
            description,
            created_at,
        })
    }
}

impl AccountStore for PgLedger {
    async fn get(&self, account_id: Uuid, owner_id: Uuid) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, name, balance, currency, active, version, created_at, updated_at
            FROM accounts
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(account_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::account_from_row).transpose()
    }

    async fn insert(&self, new: NewAccount) -> Result<Account, StoreError> {
        let account = Account::create(Uuid::new_v4(), new);

        sqlx::query(
            r#"
            INSERT INTO accounts (id, owner_id, name, balance, currency, active, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(account.id())
        .bind(account.owner_id())
        .bind(account.name())
        .bind(account.balance().minor_units())
        .bind(account.currency())
        .bind(account.is_active())
        .bind(account.version())
        .bind(account.created_at())
        .bind(account.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(account)
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<Account>, StoreError> {
        let rows: Vec<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, name, balance, currency, active, version, created_at, updated_at
            FROM accounts
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::account_from_row).collect()
    }
}

impl LedgerLog for PgLedger {
    async fn entries(
        &self,
        account_id: Uuid,
        owner_id: Uuid,
        limit: EntryLimit,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            r#"
            SELECT id, account_id, owner_id, kind, amount, balance_after, description, created_at
            FROM ledger_entries
            WHERE account_id = $1 AND owner_id = $2
            ORDER BY id DESC
            LIMIT $3
            "#,
        )
        .bind(account_id)
        .bind(owner_id)
        .bind(i64::from(limit.get()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::entry_from_row).collect()
    }
}

impl LedgerCommit for PgLedger {
    async fn commit(
        &self,
        updated: &Account,
        expected_version: i64,
        draft: EntryDraft,
    ) -> Result<(Account, LedgerEntry), StoreError> {
        let mut tx = self.pool.begin().await?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = $1, version = $2, updated_at = $3
            WHERE id = $4 AND version = $5
            "#,
        )
        .bind(updated.balance().minor_units())
        .bind(updated.version())
        .bind(updated.updated_at())
        .bind(updated.id())
        .bind(expected_version)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            // Dropping the transaction rolls back; nothing becomes visible.
            return Err(StoreError::VersionConflict {
                account_id: updated.id(),
                expected: expected_version,
            });
        }

        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO ledger_entries (account_id, owner_id, kind, amount, balance_after, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at
            "#,
        )
        .bind(draft.account_id)
        .bind(draft.owner_id)
        .bind(draft.kind.as_str())
        .bind(draft.amount.minor_units())
        .bind(draft.balance_after.minor_units())
        .bind(&draft.description)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let entry = LedgerEntry {
            id,
            account_id: draft.account_id,
            owner_id: draft.owner_id,
            kind: draft.kind,
            amount: draft.amount,
            balance_after: draft.balance_after,
            description: draft.description,
            created_at,
        };

        Ok((updated.clone(), entry))
    }
}
