//! Command and receipt types
//!
//! A command represents the intention to apply one transaction; the receipt
//! is the committed outcome.

use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::{Account, Balance, LedgerEntry};

/// Command to apply a single credit or debit to an account.
///
/// `kind` and `amount` arrive untrusted and are validated by the engine:
/// the amount must be positive minor units and the kind must normalize to
/// credit or debit.
#[derive(Debug, Clone)]
pub struct TransactionCommand {
    /// Target account
    pub account_id: Uuid,
    /// Authenticated owner of the account
    pub owner_id: Uuid,
    /// Transaction type as supplied by the caller (synonyms accepted)
    pub kind: String,
    /// Amount in minor units
    pub amount: i64,
    /// Free-form description, may be empty
    pub description: String,
    /// Abort between retries once this instant has passed
    pub deadline: Option<Instant>,
}

impl TransactionCommand {
    pub fn new(account_id: Uuid, owner_id: Uuid, kind: impl Into<String>, amount: i64) -> Self {
        Self {
            account_id,
            owner_id,
            kind: kind.into(),
            amount,
            description: String::new(),
            deadline: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Outcome of a committed transaction: the post-commit account state and the
/// entry that was appended for it.
#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    pub account: Account,
    pub entry: LedgerEntry,
}

/// Read-side balance view of an account.
#[derive(Debug, Clone)]
pub struct AccountBalance {
    pub account_id: Uuid,
    pub balance: Balance,
    pub currency: String,
}
