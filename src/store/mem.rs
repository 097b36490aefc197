//! In-memory store
//!
//! Test implementation of the store traits. Accounts and the log live under
//! one mutex, so `commit` is as indivisible as the database transaction it
//! stands in for: the version check, the account write, and the entry append
//! happen under a single lock acquisition.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Account, EntryDraft, LedgerEntry, NewAccount};

use super::{AccountStore, EntryLimit, LedgerCommit, LedgerLog, StoreError};

#[derive(Debug, Default)]
struct MemState {
    accounts: HashMap<Uuid, Account>,
    log: Vec<LedgerEntry>,
    next_entry_id: i64,
}

/// In-memory ledger store for engine tests
#[derive(Debug, Clone, Default)]
pub struct MemLedger {
    state: Arc<Mutex<MemState>>,
}

impl MemLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemState> {
        self.state.lock().expect("ledger state lock poisoned")
    }

    /// Number of committed entries for an account, across the whole log.
    pub fn entry_count(&self, account_id: Uuid) -> usize {
        self.lock()
            .log
            .iter()
            .filter(|e| e.account_id == account_id)
            .count()
    }

    /// Every committed entry for an account, oldest first.
    pub fn entries_oldest_first(&self, account_id: Uuid) -> Vec<LedgerEntry> {
        self.lock()
            .log
            .iter()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect()
    }

    /// Bump the stored version of an account, as a concurrent winner would.
    pub fn bump_version(&self, account_id: Uuid) {
        let mut state = self.lock();
        if let Some(account) = state.accounts.get(&account_id) {
            let bumped = Account::from_stored(
                account.id(),
                account.owner_id(),
                account.name().to_string(),
                account.balance(),
                account.currency().to_string(),
                account.is_active(),
                account.version() + 1,
                account.created_at(),
                account.updated_at(),
            );
            state.accounts.insert(account_id, bumped);
        }
    }

    /// Replace the stored account wholesale (test setup only).
    pub fn put_account(&self, account: Account) {
        self.lock().accounts.insert(account.id(), account);
    }
}

impl AccountStore for MemLedger {
    async fn get(&self, account_id: Uuid, owner_id: Uuid) -> Result<Option<Account>, StoreError> {
        let state = self.lock();
        Ok(state
            .accounts
            .get(&account_id)
            .filter(|a| a.owner_id() == owner_id)
            .cloned())
    }

    async fn insert(&self, new: NewAccount) -> Result<Account, StoreError> {
        let account = Account::create(Uuid::new_v4(), new);
        self.lock().accounts.insert(account.id(), account.clone());
        Ok(account)
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<Account>, StoreError> {
        let state = self.lock();
        let mut accounts: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| a.owner_id() == owner_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(accounts)
    }
}

impl LedgerLog for MemLedger {
    async fn entries(
        &self,
        account_id: Uuid,
        owner_id: Uuid,
        limit: EntryLimit,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let state = self.lock();
        Ok(state
            .log
            .iter()
            .rev()
            .filter(|e| e.account_id == account_id && e.owner_id == owner_id)
            .take(limit.get() as usize)
            .cloned()
            .collect())
    }
}

impl LedgerCommit for MemLedger {
    async fn commit(
        &self,
        updated: &Account,
        expected_version: i64,
        draft: EntryDraft,
    ) -> Result<(Account, LedgerEntry), StoreError> {
        let mut state = self.lock();

        let stored_version = state
            .accounts
            .get(&updated.id())
            .map(|a| a.version())
            .unwrap_or(0);

        if stored_version != expected_version {
            return Err(StoreError::VersionConflict {
                account_id: updated.id(),
                expected: expected_version,
            });
        }

        state.accounts.insert(updated.id(), updated.clone());

        state.next_entry_id += 1;
        let entry = LedgerEntry {
            id: state.next_entry_id,
            account_id: draft.account_id,
            owner_id: draft.owner_id,
            kind: draft.kind,
            amount: draft.amount,
            balance_after: draft.balance_after,
            description: draft.description,
            created_at: Utc::now(),
        };
        state.log.push(entry.clone());

        Ok((updated.clone(), entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Amount, EntryKind};

    fn new_account(store: &MemLedger, owner_id: Uuid) -> Account {
        let account = Account::create(
            Uuid::new_v4(),
            NewAccount {
                owner_id,
                name: "Checking".to_string(),
                currency: "USD".to_string(),
            },
        );
        store.put_account(account.clone());
        account
    }

    fn draft_for(account: &Account, amount: i64, balance_after: i64) -> EntryDraft {
        EntryDraft {
            account_id: account.id(),
            owner_id: account.owner_id(),
            kind: EntryKind::Credit,
            amount: Amount::new(amount).unwrap(),
            balance_after: crate::domain::Balance::new(balance_after).unwrap(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_get_owner_mismatch_is_none() {
        let store = MemLedger::new();
        let account = new_account(&store, Uuid::new_v4());

        let found = store.get(account.id(), account.owner_id()).await.unwrap();
        assert!(found.is_some());

        let other_owner = store.get(account.id(), Uuid::new_v4()).await.unwrap();
        assert!(other_owner.is_none());
    }

    #[tokio::test]
    async fn test_commit_version_conflict_appends_nothing() {
        let store = MemLedger::new();
        let account = new_account(&store, Uuid::new_v4());

        let updated = account
            .apply(EntryKind::Credit, &Amount::new(500).unwrap())
            .unwrap();
        let draft = draft_for(&account, 500, 500);

        // A concurrent writer wins first.
        store.bump_version(account.id());

        let result = store.commit(&updated, account.version(), draft).await;
        assert!(matches!(result, Err(StoreError::VersionConflict { .. })));
        assert_eq!(store.entry_count(account.id()), 0);
    }

    #[tokio::test]
    async fn test_entries_newest_first_and_limited() {
        let store = MemLedger::new();
        let mut account = new_account(&store, Uuid::new_v4());
        let owner_id = account.owner_id();
        let account_id = account.id();

        for i in 1..=5 {
            let updated = account
                .apply(EntryKind::Credit, &Amount::new(100 * i).unwrap())
                .unwrap();
            let draft = EntryDraft {
                account_id,
                owner_id,
                kind: EntryKind::Credit,
                amount: Amount::new(100 * i).unwrap(),
                balance_after: updated.balance(),
                description: String::new(),
            };
            let (committed, _) = store.commit(&updated, account.version(), draft).await.unwrap();
            account = committed;
        }

        let entries = store
            .entries(account_id, owner_id, EntryLimit::new(Some(3)))
            .await
            .unwrap();

        assert_eq!(entries.len(), 3);
        // Newest first: ids strictly decreasing
        assert!(entries.windows(2).all(|w| w[0].id > w[1].id));
        assert_eq!(entries[0].amount.minor_units(), 500);
    }
}
