use thiserror::Error;
use uuid::Uuid;

use crate::schema::Violations;

/// Application-wide error types for the news API.
#[derive(Error, Debug)]
pub enum AppError {
    /// No category row matches the given identifier.
    #[error("Unknown category: {0}")]
    CategoryNotFound(Uuid),

    /// The client sent something the API cannot accept.
    #[error("Invalid input: {message}")]
    InvalidInput { target: String, message: String },

    /// A JSON document does not match its schema.
    #[error("Schema validation failed for {schema}: {violations}")]
    SchemaValidation {
        schema: String,
        violations: Violations,
    },

    /// A schema could not be loaded, compiled or found.
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A transaction could not be rolled back; the connection state is unknown.
    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A dependency answered with something unusable.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    pub fn invalid_input(target: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::InvalidInput {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Returns true for the domain-level "no row matches" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::CategoryNotFound(_))
    }

    /// Returns true if the error was caused by the client rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::CategoryNotFound(_)
                | AppError::InvalidInput { .. }
                | AppError::SchemaValidation { .. }
        )
    }
}
