//! Operation Context
//!
//! Metadata about the current request, carried from the auth middleware into
//! the engine for audit logging and tracing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationContext {
    /// API token used for this request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<Uuid>,

    /// Authenticated owner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl OperationContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self {
            token_id: None,
            owner_id: None,
            correlation_id: None,
        }
    }

    /// Attach the API token id
    pub fn with_token(mut self, token_id: Uuid) -> Self {
        self.token_id = Some(token_id);
        self
    }

    /// Attach the authenticated owner id
    pub fn with_owner(mut self, owner_id: Uuid) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Attach a correlation id
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let token_id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        let context = OperationContext::new()
            .with_token(token_id)
            .with_owner(owner_id)
            .with_correlation_id(correlation_id);

        assert_eq!(context.token_id, Some(token_id));
        assert_eq!(context.owner_id, Some(owner_id));
        assert_eq!(context.correlation_id, Some(correlation_id));
    }
}
