//! Ledger errors
//!
//! The closed set of outcomes a transaction or read can fail with. Callers
//! dispatch on these variants, never on message text.

use uuid::Uuid;

use crate::store::StoreError;

/// Errors returned by the ledger engine
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Amount is zero, negative, or not representable in minor units
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Transaction type normalizes to neither credit nor debit
    #[error("Invalid transaction type: {0:?}")]
    InvalidKind(String),

    /// Account does not exist for this owner. Owner mismatch is deliberately
    /// indistinguishable from non-existence.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Account no longer accepts transactions
    #[error("Account is inactive")]
    AccountInactive,

    /// Debit would take the balance below zero
    #[error("Insufficient funds")]
    InsufficientFunds { required: i64, available: i64 },

    /// Conflict retries exhausted; the caller may retry later
    #[error("Account is busy, try again")]
    Busy,

    /// Infrastructure failure in the store
    #[error("Ledger store unavailable")]
    StoreUnavailable(#[source] StoreError),
}

impl LedgerError {
    /// Check if this is a client error (the request was at fault)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InvalidKind(_)
                | Self::NotFound(_)
                | Self::AccountInactive
                | Self::InsufficientFunds { .. }
        )
    }

    /// Check if retrying the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy | Self::StoreUnavailable(_))
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        LedgerError::StoreUnavailable(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_is_client_error() {
        let err = LedgerError::InsufficientFunds {
            required: 15_000,
            available: 10_000,
        };
        assert!(err.is_client_error());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Insufficient funds");
    }

    #[test]
    fn test_busy_is_retryable() {
        assert!(LedgerError::Busy.is_retryable());
        assert!(!LedgerError::Busy.is_client_error());
    }

    #[test]
    fn test_store_error_converts_to_unavailable() {
        let err: LedgerError = StoreError::InvalidState("bad row".to_string()).into();
        assert!(matches!(err, LedgerError::StoreUnavailable(_)));
        assert!(err.is_retryable());
    }
}
