//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"campaign"`.
        entity: &'static str,
        /// The identifier that was looked up.
        id: Uuid,
    },

    /// The requested transition is not permitted from the current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed input or a missing required field.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_entity_and_id() {
        let id = Uuid::nil();
        let err = DomainError::not_found("segment", id);
        assert_eq!(err.to_string(), format!("segment not found: {id}"));
    }
}
