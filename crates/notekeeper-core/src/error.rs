//! Error types for the Notekeeper system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotekeeperError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    /// Login failed. Deliberately carries no reason so callers cannot
    /// tell an unknown email from a wrong password.
    #[error("Incorrect email or password")]
    AuthenticationFailed,

    /// A protected operation was attempted without a valid token.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type NotekeeperResult<T> = Result<T, NotekeeperError>;

impl NotekeeperError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
