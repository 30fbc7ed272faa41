//! Token Authority — HS256 JWT issuance and validation.
//!
//! Tokens are stateless: nothing is persisted server-side and there is
//! no revocation. A token stays valid until `exp` even if the account
//! is later deleted.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject — the account email.
    pub sub: String,
    /// Numeric user ID, encoded as a decimal string.
    pub id: String,
    /// Expiration (Unix timestamp, exclusive).
    pub exp: i64,
}

/// Decoding target that tolerates absent fields so a missing claim
/// can be reported as such instead of as a parse failure.
#[derive(Debug, Deserialize)]
struct PresentedClaims {
    sub: Option<String>,
    id: Option<String>,
    exp: Option<i64>,
}

/// Verified identity extracted from a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaim {
    pub subject: String,
    pub user_id: i64,
}

/// Issues and validates signed access tokens with a single
/// process-wide secret.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenAuthority {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        if config.jwt_secret.is_empty() {
            return Err(AuthError::Crypto("JWT secret must not be empty".into()));
        }

        let default_ttl = i64::try_from(config.token_lifetime_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                AuthError::LifetimeOutOfRange(format!("{} seconds", config.token_lifetime_secs))
            })?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `validate_at` so that `now == exp` is
        // already expired and the clock can be injected.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims::<&str>(&[]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            default_ttl,
        })
    }

    /// Lifetime used for tokens issued at login.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `subject`/`user_id` expiring `ttl` from now.
    pub fn issue(&self, subject: &str, user_id: i64, ttl: Duration) -> Result<String, AuthError> {
        self.issue_at(subject, user_id, ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &str,
        user_id: i64,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::LifetimeOutOfRange(format!("{ttl} from {now}")))?;
        let claims = TokenClaims {
            sub: subject.to_string(),
            id: user_id.to_string(),
            exp: expires_at.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
    }

    /// Verify signature and expiry and return the identity.
    pub fn validate(&self, token: &str) -> Result<IdentityClaim, AuthError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaim, AuthError> {
        let data =
            jsonwebtoken::decode::<PresentedClaims>(token, &self.decoding_key, &self.validation)
                .map_err(|e| match e.kind() {
                    ErrorKind::InvalidSignature => AuthError::TokenSignatureInvalid,
                    _ => AuthError::TokenMalformed(e.to_string()),
                })?;
        let claims = data.claims;

        let exp = claims.exp.ok_or(AuthError::ClaimMissing("exp"))?;
        let subject = claims
            .sub
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::ClaimMissing("sub"))?;
        let raw_id = claims
            .id
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::ClaimMissing("id"))?;
        let user_id = raw_id
            .parse::<i64>()
            .map_err(|e| AuthError::TokenMalformed(format!("invalid user id: {e}")))?;

        if now.timestamp() >= exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(IdentityClaim { subject, user_id })
    }
}
