//! Error types for the backoffice library.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all backoffice operations.
#[derive(Error, Debug)]
pub enum BackofficeError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Offer missing or owned by somebody else
    #[error("Offer with ID {id} not found")]
    OfferNotFound { id: u64 },
    /// Step missing or not part of the addressed offer
    #[error("Step with ID {id} not found")]
    StepNotFound { id: u64 },
    /// Acquirer missing or owned by somebody else
    #[error("Acquirer with ID {id} not found")]
    AcquirerNotFound { id: u64 },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// A store rejected a row because `(offer_id, step_no)` is already taken.
    ///
    /// The sequencer consumes this variant and retries once; callers only see
    /// it when talking to a store directly.
    #[error("Step number {step_no} is already taken in offer {offer_id}")]
    DuplicateStepNumber { offer_id: u64, step_no: u32 },
    /// Step number collision that survived the retry
    #[error("Step number {step_no} in offer {offer_id} collided twice; try again")]
    Conflict { offer_id: u64, step_no: u32 },
    /// The first step of an offer cannot be removed
    #[error("Step with ID {id} is the first step of its offer and cannot be deleted")]
    ProtectedStep { id: u64 },
    /// No owner attached to the session
    #[error("No authenticated owner for this request")]
    Unauthenticated,
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> BackofficeError {
        BackofficeError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> BackofficeError {
        BackofficeError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl BackofficeError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// True for every "does not exist or is not yours" failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::OfferNotFound { .. } | Self::StepNotFound { .. } | Self::AcquirerNotFound { .. }
        )
    }

    /// True when the caller may simply repeat the request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| BackofficeError::database(message).with_source(e))
    }
}

/// Result type alias for backoffice operations
pub type Result<T> = std::result::Result<T, BackofficeError>;
