//! Error types for the Pokerbook ledger.

use thiserror::Error;

/// A shared error type for the entire Pokerbook workspace.
///
/// The first three variants are the user-facing taxonomy of the ledger
/// (bad input, unknown id, state conflict). The remaining variants belong to the
/// adapters around it and never originate from a ledger command.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// Bad user input (empty name, non-positive or negative amount).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The operation conflicts with the current ledger state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A remote service (spreadsheet, payment provider) failed.
    #[error("{service} error: {message}")]
    External {
        service: &'static str,
        message: String,
    },
}

impl LedgerError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an External error for the named service
    pub fn external(service: &'static str, message: impl Into<String>) -> Self {
        Self::External {
            service,
            message: message.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Self::External { .. })
    }

    /// True for the errors a ledger command reports back to the user without
    /// applying anything.
    pub fn is_user_facing(&self) -> bool {
        self.is_validation() || self.is_not_found() || self.is_conflict()
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, LedgerError>`.
pub type Result<T> = std::result::Result<T, LedgerError>;
