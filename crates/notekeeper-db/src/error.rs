//! Database-specific error types and conversions.

use notekeeper_core::error::NotekeeperError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    Duplicate { entity: String },
}

impl DbError {
    /// Classify a failed statement, recognising unique-index
    /// violations.
    pub(crate) fn from_statement(entity: &str, err: impl std::fmt::Display) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            DbError::Duplicate {
                entity: entity.into(),
            }
        } else {
            DbError::Query(message)
        }
    }

    /// Whether the failure is an optimistic transaction conflict that
    /// succeeds when the transaction is run again.
    pub fn is_conflict(&self) -> bool {
        let message = match self {
            DbError::Surreal(e) => e.to_string(),
            DbError::Query(message) => message.clone(),
            _ => return false,
        };
        let message = message.to_ascii_lowercase();
        message.contains("conflict") && message.contains("retr")
    }
}

impl From<DbError> for NotekeeperError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => NotekeeperError::NotFound { entity, id },
            DbError::Duplicate { entity } => NotekeeperError::AlreadyExists { entity },
            other => NotekeeperError::Database(other.to_string()),
        }
    }
}
