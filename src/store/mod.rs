//! Store module
//!
//! Persistence traits for the ledger and their implementations. The engine
//! receives a store by injection at construction; nothing in the crate holds
//! a process-wide database handle.

mod error;
pub mod postgres;

#[cfg(test)]
pub mod mem;

pub use error::StoreError;
pub use postgres::PgLedger;

use uuid::Uuid;

use crate::domain::{Account, EntryDraft, LedgerEntry, NewAccount};

/// Default number of entries returned when the caller does not ask for one.
pub const DEFAULT_ENTRY_LIMIT: u32 = 50;

/// Upper bound on entries returned per read, whatever the caller asks for.
pub const MAX_ENTRY_LIMIT: u32 = 200;

/// A page size for entry reads, clamped to `[1, MAX_ENTRY_LIMIT]` at
/// construction so no log implementation can be asked for an unbounded read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLimit(u32);

impl EntryLimit {
    pub fn new(requested: Option<u32>) -> Self {
        Self(requested.unwrap_or(DEFAULT_ENTRY_LIMIT).clamp(1, MAX_ENTRY_LIMIT))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for EntryLimit {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Persisted accounts, scoped by owner.
///
/// `get` returns `None` both for an unknown account id and for an account
/// owned by someone else; callers cannot distinguish the two. Reads never
/// block writers of other accounts.
#[allow(async_fn_in_trait)]
pub trait AccountStore {
    async fn get(&self, account_id: Uuid, owner_id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Persist a new account with balance zero and version 1.
    async fn insert(&self, new: NewAccount) -> Result<Account, StoreError>;

    /// All accounts belonging to `owner_id`, newest first.
    async fn list(&self, owner_id: Uuid) -> Result<Vec<Account>, StoreError>;
}

/// Append-only log of committed ledger entries.
///
/// Entries are inserted only through [`LedgerCommit::commit`]; there is no
/// update or delete. Reads are newest first and bounded by [`EntryLimit`];
/// entry ids are monotonic by insertion, so non-concurrent paginated reads
/// never return an entry twice.
#[allow(async_fn_in_trait)]
pub trait LedgerLog {
    async fn entries(
        &self,
        account_id: Uuid,
        owner_id: Uuid,
        limit: EntryLimit,
    ) -> Result<Vec<LedgerEntry>, StoreError>;
}

/// The indivisible write+append unit of a ledger transaction.
#[allow(async_fn_in_trait)]
pub trait LedgerCommit {
    /// Store `updated` (already carrying the new balance and `expected_version
    /// + 1`) if and only if the stored version still equals
    /// `expected_version`, and append `draft` in the same atomic unit.
    ///
    /// On `StoreError::VersionConflict` nothing is written: no partial account
    /// update, no orphaned entry. The returned entry carries its assigned id
    /// and commit timestamp.
    async fn commit(
        &self,
        updated: &Account,
        expected_version: i64,
        draft: EntryDraft,
    ) -> Result<(Account, LedgerEntry), StoreError>;
}
