//! Access-control gate for protected operations.
//!
//! Fails closed: anything other than a well-formed, correctly signed,
//! unexpired bearer token is rejected with a uniform
//! [`NotekeeperError::Unauthorized`] before any business logic runs.

use notekeeper_core::error::{NotekeeperError, NotekeeperResult};
use tracing::debug;

use crate::error::AuthError;
use crate::token::{IdentityClaim, TokenAuthority};

const BEARER_SCHEME: &str = "bearer";

/// Extract the token from an `Authorization` header value of the form
/// `Bearer <token>`. The scheme is matched case-insensitively.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or_else(|| AuthError::TokenMalformed("missing authorization".into()))?;
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or_else(|| AuthError::TokenMalformed("expected `Bearer <token>`".into()))?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthError::TokenMalformed(format!(
            "unsupported scheme `{scheme}`"
        )));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::TokenMalformed("empty bearer token".into()));
    }
    Ok(token)
}

/// Binds a verified [`IdentityClaim`] to each protected request.
#[derive(Clone)]
pub struct AccessGate {
    authority: TokenAuthority,
}

impl AccessGate {
    pub fn new(authority: TokenAuthority) -> Self {
        Self { authority }
    }

    /// Authorize a request from its raw `Authorization` header.
    pub fn authorize(&self, authorization: Option<&str>) -> NotekeeperResult<IdentityClaim> {
        bearer_token(authorization)
            .and_then(|token| self.authority.validate(token))
            .map_err(|e| {
                debug!(reason = %e, "Rejected protected request");
                NotekeeperError::from(e)
            })
    }

    /// Authorize a request from an already extracted token.
    pub fn authorize_token(&self, token: &str) -> NotekeeperResult<IdentityClaim> {
        self.authority.validate(token).map_err(|e| {
            debug!(reason = %e, "Rejected protected request");
            NotekeeperError::from(e)
        })
    }
}
