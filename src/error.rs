//! Error types for eavql.

use thiserror::Error;

use crate::ast::QualifiedName;

/// The main error type for eavql operations.
///
/// Compilation either fully succeeds or fails with one of these; no partial
/// SQL text or bound values escape a failed compile.
#[derive(Debug, Error)]
pub enum EavError {
    /// The predicate cannot be expressed for this value shape or dialect.
    #[error("Unsupported predicate '{predicate}': {reason}")]
    UnsupportedPredicate {
        predicate: &'static str,
        reason: String,
    },

    /// A qualified name referenced by the predicate has no slot metadata.
    #[error("No slot metadata registered for '{0}'")]
    MissingSlotMetadata(QualifiedName),

    /// A containment value holds a nested collection.
    #[error("Invalid containment value for '{path}': {reason}")]
    InvalidContainmentValue { path: String, reason: String },

    /// A navigation path without any step.
    #[error("Path must contain at least one step")]
    EmptyPath,

    /// A containment predicate targets a single-valued slot.
    #[error("'{0}' is not a collection or many-association")]
    NotACollection(QualifiedName),

    /// No concrete entity type is assignable to the requested result type.
    #[error("Unknown result type: '{0}'")]
    UnknownResultType(String),

    /// Value composite descent exceeded the configured depth.
    #[error("Value nesting exceeds maximum depth of {max}")]
    NestingTooDeep { max: usize },

    /// Layout configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema metadata could not be loaded.
    #[error("Schema error: {0}")]
    Schema(String),
}

impl EavError {
    /// Create an unsupported predicate error.
    pub fn unsupported(predicate: &'static str, reason: impl Into<String>) -> Self {
        Self::UnsupportedPredicate {
            predicate,
            reason: reason.into(),
        }
    }

    /// Create an invalid containment value error.
    pub fn invalid_containment(path: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidContainmentValue {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for EavError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for EavError {
    fn from(err: serde_json::Error) -> Self {
        Self::Schema(err.to_string())
    }
}

/// Result type alias for eavql operations.
pub type EavResult<T> = Result<T, EavError>;
