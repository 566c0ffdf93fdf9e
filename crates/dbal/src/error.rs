//! Error types for dbal

use thiserror::Error;

/// Result type alias for dbal operations
pub type DbalResult<T> = Result<T, DbalError>;

/// Error types for the abstraction layer.
///
/// Three classes of failure: argument/precondition violations, logic
/// errors (API misuse that would otherwise produce invalid SQL), and
/// driver errors propagated verbatim. All of them abort the current
/// operation; nothing is retried here and no partial SQL is returned.
#[derive(Debug, Error)]
pub enum DbalError {
    /// Precondition violation in a caller-supplied argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// API misuse that would produce invalid or unsafe SQL
    #[error("Logic error: {0}")]
    Logic(String),

    /// Named connection missing from the manager configuration
    #[error("Connection \"{0}\" was not found")]
    UnknownConnection(String),

    /// Bind type name missing from the type registry
    #[error("Unknown bind type \"{0}\"")]
    UnknownType(String),

    /// Configuration parse or shape error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Driver error, propagated verbatim
    #[error(transparent)]
    Driver(#[from] rusqlite::Error),
}

impl DbalError {
    /// Create an argument/precondition error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a logic error
    pub fn logic(message: impl Into<String>) -> Self {
        Self::Logic(message.into())
    }

    /// Check if this is an argument/precondition error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::UnknownConnection(_))
    }

    /// Check if this is a logic error
    pub fn is_logic(&self) -> bool {
        matches!(self, Self::Logic(_) | Self::UnknownType(_))
    }

    /// Check if this is a driver error
    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_))
    }
}
