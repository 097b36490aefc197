//! Store Errors
//!
//! Error types for the persistence layer.

use uuid::Uuid;

/// Errors that can occur in the account store and ledger log
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Optimistic concurrency conflict: the stored version moved between the
    /// read and the write. Handled by the engine's retry loop, never surfaced
    /// to callers as its own outcome.
    #[error("Version conflict for account {account_id}: expected version {expected}")]
    VersionConflict { account_id: Uuid, expected: i64 },

    /// Stored data that no longer decodes into valid domain state
    #[error("Invalid stored state: {0}")]
    InvalidState(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Check if this error is a concurrency conflict
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_version_conflict() {
        let conflict = StoreError::VersionConflict {
            account_id: Uuid::new_v4(),
            expected: 3,
        };
        assert!(conflict.is_version_conflict());

        let invalid = StoreError::InvalidState("negative balance".to_string());
        assert!(!invalid.is_version_conflict());
    }
}
