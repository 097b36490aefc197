//! Ledger entries
//!
//! Immutable facts appended to the ledger log. An entry is created exactly
//! once by a committed transaction and is never edited or removed; the public
//! contract offers no update or delete operation for entries at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kind::EntryKind;
use super::money::{Amount, Balance};

/// A committed ledger entry.
///
/// `id` is assigned by the log at insertion and is monotonically ordered by
/// insertion, which is what makes newest-first pagination stable.
/// `balance_after` caches the account balance immediately after this entry
/// was applied; per account, consecutive entries chain:
/// `balance_after[n] == balance_after[n-1] + signed_delta[n]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub account_id: Uuid,
    pub owner_id: Uuid,
    pub kind: EntryKind,
    pub amount: Amount,
    pub balance_after: Balance,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Signed delta this entry contributed to the balance:
    /// `+amount` for credits, `-amount` for debits.
    pub fn signed_delta(&self) -> i64 {
        self.kind.sign() * self.amount.minor_units()
    }
}

/// An entry about to be committed. The log assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub account_id: Uuid,
    pub owner_id: Uuid,
    pub kind: EntryKind,
    pub amount: Amount,
    pub balance_after: Balance,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: EntryKind, amount: i64, balance_after: i64) -> LedgerEntry {
        LedgerEntry {
            id: 1,
            account_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            kind,
            amount: Amount::new(amount).unwrap(),
            balance_after: Balance::new(balance_after).unwrap(),
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_signed_delta() {
        assert_eq!(entry(EntryKind::Credit, 500, 500).signed_delta(), 500);
        assert_eq!(entry(EntryKind::Debit, 300, 200).signed_delta(), -300);
    }

    #[test]
    fn test_entry_serialization() {
        let entry = entry(EntryKind::Credit, 10_000, 10_000);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""kind":"credit""#));

        let back: LedgerEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.amount, entry.amount);
        assert_eq!(back.balance_after, entry.balance_after);
    }
}
