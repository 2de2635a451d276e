//! Error types for the relation engine
//!
//! Every failure in the engine is returned as a `RelationError`. The boundary
//! layer decides how each variant is presented to clients.

use thiserror::Error;

/// Result type alias for relation operations
pub type RelationResult<T> = Result<T, RelationError>;

/// Error types for relation operations
#[derive(Debug, Error)]
pub enum RelationError {
    #[error("No ids supplied for {operation}")]
    EmptyOperand { operation: String },

    #[error("Relation not found: {relation}")]
    RelationNotFound { relation: String },

    #[error("Field '{field}' not found on record")]
    FieldNotFound { field: String },

    #[error("Field '{field}' is not a sequence")]
    NotASequence { field: String },

    #[error("Field '{field}' cannot be set: {reason}")]
    Unsettable { field: String, reason: String },

    #[error("Record '{id}' not found in '{resource}'")]
    NotFound { resource: String, id: String },

    #[error("Unsupported relation type '{relation_type}' on relation '{relation}'")]
    UnsupportedRelationType {
        relation: String,
        relation_type: String,
    },

    #[error("Repository error during {operation}: {source}")]
    Upstream {
        operation: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("No repository registered for resource '{resource}'")]
    UnknownResource { resource: String },

    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },

    #[error("Action '{action}' requires a parent id")]
    MissingParentId { action: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RelationError {
    /// Create an empty operand error for the named operation
    pub fn empty_operand(operation: impl Into<String>) -> Self {
        Self::EmptyOperand {
            operation: operation.into(),
        }
    }

    /// Create a relation not found error
    pub fn relation_not_found(relation: impl Into<String>) -> Self {
        Self::RelationNotFound {
            relation: relation.into(),
        }
    }

    /// Create a field not found error
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
        }
    }

    /// Create a not-a-sequence error
    pub fn not_a_sequence(field: impl Into<String>) -> Self {
        Self::NotASequence {
            field: field.into(),
        }
    }

    /// Create an unsettable field error
    pub fn unsettable(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unsettable {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a not found error for a record of a resource
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create an unsupported relation type error
    pub fn unsupported(relation: impl Into<String>, relation_type: impl Into<String>) -> Self {
        Self::UnsupportedRelationType {
            relation: relation.into(),
            relation_type: relation_type.into(),
        }
    }

    /// Wrap a repository failure
    pub fn upstream<E>(operation: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Upstream {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// Create an unknown resource error
    pub fn unknown_resource(resource: impl Into<String>) -> Self {
        Self::UnknownResource {
            resource: resource.into(),
        }
    }

    /// Create an invalid payload error
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Get error code for consistent API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            RelationError::EmptyOperand { .. } => "EMPTY_OPERAND",
            RelationError::RelationNotFound { .. } => "RELATION_NOT_FOUND",
            RelationError::FieldNotFound { .. } => "FIELD_NOT_FOUND",
            RelationError::NotASequence { .. } => "NOT_A_SEQUENCE",
            RelationError::Unsettable { .. } => "FIELD_UNSETTABLE",
            RelationError::NotFound { .. } => "RECORD_NOT_FOUND",
            RelationError::UnsupportedRelationType { .. } => "UNSUPPORTED_RELATION_TYPE",
            RelationError::Upstream { .. } => "UPSTREAM_ERROR",
            RelationError::UnknownResource { .. } => "UNKNOWN_RESOURCE",
            RelationError::InvalidPayload { .. } => "INVALID_PAYLOAD",
            RelationError::MissingParentId { .. } => "MISSING_PARENT_ID",
            RelationError::Serialization(_) => "SERIALIZATION_ERROR",
            RelationError::Configuration { .. } => "CONFIGURATION_ERROR",
            RelationError::Io(_) => "IO_ERROR",
            RelationError::Yaml(_) => "YAML_ERROR",
        }
    }

    /// Whether the failure comes from the record shape disagreeing with a descriptor
    pub fn is_shape_violation(&self) -> bool {
        matches!(
            self,
            RelationError::FieldNotFound { .. }
                | RelationError::NotASequence { .. }
                | RelationError::Unsettable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RelationError::not_found("users", "5");
        assert_eq!(err.to_string(), "Record '5' not found in 'users'");

        let err = RelationError::unsupported("tags", "Polymorphic");
        assert_eq!(
            err.to_string(),
            "Unsupported relation type 'Polymorphic' on relation 'tags'"
        );
    }

    #[test]
    fn test_upstream_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = RelationError::upstream("update", io);

        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_shape_violations() {
        assert!(RelationError::field_not_found("Items").is_shape_violation());
        assert!(RelationError::not_a_sequence("Items").is_shape_violation());
        assert!(RelationError::unsettable("Owner", "not nullable").is_shape_violation());
        assert!(!RelationError::empty_operand("attach").is_shape_violation());
    }
}
