//! Authentication configuration.

use std::fmt;

/// Configuration for the authentication core.
///
/// Built once at startup and handed to [`crate::CredentialVerifier`]
/// and [`crate::TokenAuthority`] by reference.
#[derive(Clone)]
pub struct AuthConfig {
    /// Symmetric HS256 signing secret.
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 1800 = 30 minutes).
    pub token_lifetime_secs: u64,
    /// Argon2id memory cost in KiB (default: 19456 = 19 MiB).
    pub hash_memory_kib: u32,
    /// Argon2id iteration count (default: 2).
    pub hash_iterations: u32,
    /// Argon2id lanes (default: 1).
    pub hash_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_lifetime_secs: 1800,
            // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
            hash_memory_kib: 19456,
            hash_iterations: 2,
            hash_parallelism: 1,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_lifetime_secs", &self.token_lifetime_secs)
            .field("hash_memory_kib", &self.hash_memory_kib)
            .field("hash_iterations", &self.hash_iterations)
            .field("hash_parallelism", &self.hash_parallelism)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_secret() {
        let config = AuthConfig {
            jwt_secret: "super-secret-signing-key".into(),
            ..Default::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret-signing-key"));
        assert!(printed.contains("<redacted>"));
    }
}
