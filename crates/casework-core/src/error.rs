//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An aggregate was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// An aggregate with this identifier already exists.
    #[error("aggregate already exists: {0}")]
    AlreadyExists(Uuid),

    /// The requested action is not allowed from the aggregate's current state.
    #[error("cannot {action} aggregate {aggregate_id}: current status is {current}")]
    InvalidTransition {
        /// The aggregate the action targeted.
        aggregate_id: Uuid,
        /// The status the aggregate was in.
        current: String,
        /// The attempted action.
        action: String,
    },

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Builds an [`DomainError::InvalidTransition`] from anything displayable.
    pub fn invalid_transition(
        aggregate_id: Uuid,
        current: impl std::fmt::Display,
        action: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidTransition {
            aggregate_id,
            current: current.to_string(),
            action: action.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message_names_state_and_action() {
        let id = Uuid::new_v4();
        let err = DomainError::invalid_transition(id, "closed", "close");

        let message = err.to_string();

        assert!(message.contains(&id.to_string()));
        assert!(message.contains("closed"));
        assert!(message.starts_with("cannot close"));
    }

    #[test]
    fn test_concurrency_conflict_message_includes_versions() {
        let err = DomainError::ConcurrencyConflict {
            aggregate_id: Uuid::nil(),
            expected: 3,
            actual: 4,
        };

        assert_eq!(
            err.to_string(),
            "concurrency conflict on aggregate 00000000-0000-0000-0000-000000000000: expected version 3, found 4"
        );
    }
}
