//! Authentication error types.

use notekeeper_core::error::NotekeeperError;
use thiserror::Error;

/// Internal failure taxonomy.
///
/// The variants stay distinct for logging, but they collapse into two
/// external outcomes when converted into [`NotekeeperError`]: credential
/// failures become `AuthenticationFailed` and token failures become
/// `Unauthorized`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credential not found")]
    CredentialNotFound,

    #[error("credential mismatch")]
    CredentialMismatch,

    #[error("malformed token: {0}")]
    TokenMalformed(String),

    #[error("token has expired")]
    TokenExpired,

    #[error("token signature is invalid")]
    TokenSignatureInvalid,

    #[error("token is missing required claim `{0}`")]
    ClaimMissing(&'static str),

    #[error("cryptography error: {0}")]
    Crypto(String),

    #[error("token lifetime out of range: {0}")]
    LifetimeOutOfRange(String),
}

impl AuthError {
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            AuthError::CredentialNotFound | AuthError::CredentialMismatch
        )
    }

    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            AuthError::TokenMalformed(_)
                | AuthError::TokenExpired
                | AuthError::TokenSignatureInvalid
                | AuthError::ClaimMissing(_)
        )
    }
}

impl From<AuthError> for NotekeeperError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::CredentialNotFound | AuthError::CredentialMismatch => {
                NotekeeperError::AuthenticationFailed
            }
            AuthError::TokenMalformed(_)
            | AuthError::TokenExpired
            | AuthError::TokenSignatureInvalid
            | AuthError::ClaimMissing(_) => NotekeeperError::Unauthorized,
            AuthError::Crypto(msg) => NotekeeperError::Crypto(msg),
            err @ AuthError::LifetimeOutOfRange(_) => NotekeeperError::Internal(err.to_string()),
        }
    }
}
