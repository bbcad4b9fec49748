//! Error types for weighted full-text search.
//!
//! Configuration errors are raised while a search configuration is being
//! built. Assembling a search from a valid configuration never fails; only
//! composing caller-supplied SQL onto an assembled search can.

use thiserror::Error;

/// Main error type for the weighted-fts library.
#[derive(Debug, Error)]
pub enum FtsError {
    /// The search configuration for an entity is unusable.
    #[error("Configuration error for {entity}: {message}")]
    Configuration { entity: String, message: String },

    /// A name that would be interpolated into SQL text is not a plain identifier.
    #[error("Invalid {kind} identifier for {entity}: {value:?}")]
    InvalidIdentifier {
        entity: String,
        kind: IdentifierKind,
        value: String,
    },

    /// A caller filter could not be composed with the search predicate.
    #[error("Invalid filter for {entity}: {message}")]
    InvalidFilter { entity: String, message: String },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

/// Which kind of identifier failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Column,
    Dictionary,
    Table,
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierKind::Column => f.write_str("column"),
            IdentifierKind::Dictionary => f.write_str("dictionary"),
            IdentifierKind::Table => f.write_str("table"),
        }
    }
}

/// Result type alias for weighted-fts operations.
pub type Result<T> = std::result::Result<T, FtsError>;

impl From<serde_json::Error> for FtsError {
    fn from(err: serde_json::Error) -> Self {
        FtsError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl FtsError {
    /// Create a configuration error for the named entity.
    pub fn configuration(entity: impl Into<String>, message: impl Into<String>) -> Self {
        FtsError::Configuration {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// The entity whose configuration was rejected, if known.
    pub fn entity(&self) -> Option<&str> {
        match self {
            FtsError::Configuration { entity, .. }
            | FtsError::InvalidIdentifier { entity, .. }
            | FtsError::InvalidFilter { entity, .. } => Some(entity),
            FtsError::Json { .. } => None,
        }
    }

    /// Check if this error comes from configuration validation.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FtsError::Configuration { .. } | FtsError::InvalidIdentifier { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message_names_entity() {
        let err = FtsError::configuration("articles", "no weighted columns");
        assert_eq!(
            err.to_string(),
            "Configuration error for articles: no weighted columns"
        );
        assert_eq!(err.entity(), Some("articles"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_invalid_identifier_display() {
        let err = FtsError::InvalidIdentifier {
            entity: "articles".to_string(),
            kind: IdentifierKind::Column,
            value: "title; drop".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid column identifier for articles: \"title; drop\""
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: FtsError = parse_err.into();
        assert!(matches!(err, FtsError::Json { .. }));
        assert!(!err.is_configuration());
        assert_eq!(err.entity(), None);
    }
}
