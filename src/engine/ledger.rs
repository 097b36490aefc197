//! Ledger engine
//!
//! Applies credits and debits atomically: validate, read the account under
//! optimistic concurrency control, compute the new balance, then commit the
//! versioned account write and the entry append as one indivisible unit.
//! A version conflict discards the whole attempt and retries from the read,
//! bounded by the retry policy; unrelated accounts never contend.

use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::{
    Account, Amount, EntryDraft, EntryKind, LedgerEntry, MoneyError, NewAccount, OperationContext,
};
use crate::store::{AccountStore, EntryLimit, LedgerCommit, LedgerLog, StoreError};

use super::{AccountBalance, LedgerError, TransactionCommand, TransactionReceipt};

/// Bounds on the conflict-retry loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts before giving up with `Busy`
    pub max_attempts: u32,
    /// Base backoff; attempt n waits `backoff_base * n`
    pub backoff_base: Duration,
}

impl RetryPolicy {
    fn backoff(&self, retry: u32) -> Duration {
        self.backoff_base * retry
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base: Duration::from_millis(50),
        }
    }
}

/// The account ledger engine.
///
/// Stores are injected at construction; the engine holds no global state and
/// is cheap to clone per request.
#[derive(Debug, Clone)]
pub struct LedgerEngine<S> {
    store: S,
    retry: RetryPolicy,
}

impl<S> LedgerEngine<S>
where
    S: AccountStore + LedgerLog + LedgerCommit,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Apply one credit or debit transaction.
    ///
    /// Validation is fail-fast, in order: positive amount, recognizable kind,
    /// account exists for this owner, account active. A debit that would take
    /// the balance below zero is rejected with `InsufficientFunds` before
    /// anything is written. On success the committed account state and the
    /// appended entry are returned together.
    pub async fn apply(
        &self,
        command: TransactionCommand,
        context: &OperationContext,
    ) -> Result<TransactionReceipt, LedgerError> {
        let amount =
            Amount::new(command.amount).map_err(|e| LedgerError::InvalidAmount(e.to_string()))?;
        let kind: EntryKind = command
            .kind
            .parse()
            .map_err(|_| LedgerError::InvalidKind(command.kind.clone()))?;

        for attempt in 0..self.retry.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.retry.backoff(attempt)).await;

                // A deadline only ever aborts between retries; an in-flight
                // commit is left to finish or roll back on its own.
                if command.deadline.is_some_and(|d| Instant::now() >= d) {
                    tracing::debug!(
                        account_id = %command.account_id,
                        attempt,
                        "Deadline passed, aborting retry"
                    );
                    return Err(LedgerError::Busy);
                }
            }

            let account = self
                .store
                .get(command.account_id, command.owner_id)
                .await?
                .ok_or(LedgerError::NotFound(command.account_id))?;

            if !account.is_active() {
                return Err(LedgerError::AccountInactive);
            }

            let updated = match account.apply(kind, &amount) {
                Ok(updated) => updated,
                Err(MoneyError::Negative {
                    required,
                    available,
                }) => {
                    return Err(LedgerError::InsufficientFunds {
                        required,
                        available,
                    })
                }
                Err(e) => return Err(LedgerError::InvalidAmount(e.to_string())),
            };

            let draft = EntryDraft {
                account_id: account.id(),
                owner_id: account.owner_id(),
                kind,
                amount,
                balance_after: updated.balance(),
                description: command.description.clone(),
            };

            match self.store.commit(&updated, account.version(), draft).await {
                Ok((account, entry)) => {
                    tracing::info!(
                        account_id = %account.id(),
                        entry_id = entry.id,
                        kind = %kind,
                        amount = %amount,
                        balance = %account.balance(),
                        correlation_id = ?context.correlation_id,
                        "Transaction committed"
                    );
                    return Ok(TransactionReceipt { account, entry });
                }
                Err(StoreError::VersionConflict { .. }) => {
                    tracing::warn!(
                        account_id = %command.account_id,
                        "Version conflict, retrying (attempt {}/{})",
                        attempt + 1,
                        self.retry.max_attempts
                    );
                    continue;
                }
                Err(e) => return Err(LedgerError::StoreUnavailable(e)),
            }
        }

        Err(LedgerError::Busy)
    }

    /// Create an account for an owner. A requested opening balance is applied
    /// as an ordinary opening-credit transaction, so the balance matches the
    /// entry log from the very first entry.
    pub async fn open_account(
        &self,
        new: NewAccount,
        opening_balance: Option<Amount>,
        context: &OperationContext,
    ) -> Result<Account, LedgerError> {
        let account = self.store.insert(new).await?;

        match opening_balance {
            None => Ok(account),
            Some(amount) => {
                let command = TransactionCommand::new(
                    account.id(),
                    account.owner_id(),
                    EntryKind::Credit.as_str(),
                    amount.minor_units(),
                )
                .with_description("Opening balance");

                let receipt = self.apply(command, context).await?;
                Ok(receipt.account)
            }
        }
    }

    /// Fetch one account, owner-scoped.
    pub async fn account(
        &self,
        account_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Account, LedgerError> {
        self.store
            .get(account_id, owner_id)
            .await?
            .ok_or(LedgerError::NotFound(account_id))
    }

    /// All accounts for an owner, newest first.
    pub async fn accounts(&self, owner_id: Uuid) -> Result<Vec<Account>, LedgerError> {
        Ok(self.store.list(owner_id).await?)
    }

    /// Current balance and currency of one account.
    pub async fn balance(
        &self,
        account_id: Uuid,
        owner_id: Uuid,
    ) -> Result<AccountBalance, LedgerError> {
        let account = self.account(account_id, owner_id).await?;
        Ok(AccountBalance {
            account_id: account.id(),
            balance: account.balance(),
            currency: account.currency().to_string(),
        })
    }

    /// Committed entries for one account, newest first, clamped by
    /// [`EntryLimit`].
    pub async fn entries(
        &self,
        account_id: Uuid,
        owner_id: Uuid,
        limit: Option<u32>,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        // Resolve ownership first so an unknown or foreign account reads as
        // NotFound rather than an empty list.
        let account = self.account(account_id, owner_id).await?;

        Ok(self
            .store
            .entries(account.id(), owner_id, EntryLimit::new(limit))
            .await?)
    }
}
