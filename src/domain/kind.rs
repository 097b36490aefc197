//! Entry kind
//!
//! Credit/debit discriminator with the transaction-type synonyms the API
//! accepts, normalized case-insensitively at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Balance increases by the entry amount.
    Credit,
    /// Balance decreases by the entry amount.
    Debit,
}

/// Error for transaction-type strings that normalize to neither kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Transaction type must be add/credit or sub/debit (got {0:?})")]
pub struct EntryKindError(pub String);

impl EntryKind {
    /// Signed delta multiplier: +1 for credit, -1 for debit.
    pub fn sign(&self) -> i64 {
        match self {
            EntryKind::Credit => 1,
            EntryKind::Debit => -1,
        }
    }

    /// Stable storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Credit => "credit",
            EntryKind::Debit => "debit",
        }
    }
}

impl FromStr for EntryKind {
    type Err = EntryKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" | "add" | "deposit" | "in" => Ok(EntryKind::Credit),
            "debit" | "sub" | "subtract" | "withdraw" | "out" => Ok(EntryKind::Debit),
            _ => Err(EntryKindError(s.to_string())),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_synonyms() {
        for s in ["credit", "Add", "deposit", "IN", " credit "] {
            assert_eq!(s.parse::<EntryKind>().unwrap(), EntryKind::Credit, "{s:?}");
        }
    }

    #[test]
    fn test_debit_synonyms() {
        for s in ["debit", "Sub", "subtract", "withdraw", "OUT"] {
            assert_eq!(s.parse::<EntryKind>().unwrap(), EntryKind::Debit, "{s:?}");
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        for s in ["transfer", "", "creditt", "de bit"] {
            assert!(s.parse::<EntryKind>().is_err(), "{s:?}");
        }
    }

    #[test]
    fn test_sign() {
        assert_eq!(EntryKind::Credit.sign(), 1);
        assert_eq!(EntryKind::Debit.sign(), -1);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&EntryKind::Credit).unwrap();
        assert_eq!(json, r#""credit""#);

        let kind: EntryKind = serde_json::from_str(r#""debit""#).unwrap();
        assert_eq!(kind, EntryKind::Debit);
    }
}
