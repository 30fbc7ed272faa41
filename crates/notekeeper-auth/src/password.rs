//! Credential Verifier — password hashing and verification using
//! Argon2id.
//!
//! Every hash gets a fresh random salt, so hashing the same plaintext
//! twice yields two different PHC strings that both verify.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Plaintext used to build the decoy hash for unknown accounts.
const DECOY_PASSWORD: &str = "notekeeper-decoy-credential";

/// Hashes and verifies passwords with a fixed cost.
///
/// Cheap to clone, so it can be moved onto the blocking pool.
#[derive(Clone)]
pub struct CredentialVerifier {
    params: Params,
    /// Hash that never matches a real login; verified against when the
    /// account does not exist so both failure paths cost the same.
    decoy_hash: String,
}

impl CredentialVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
            None,
        )
        .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;

        let mut verifier = Self {
            params,
            decoy_hash: String::new(),
        };
        verifier.decoy_hash = verifier.hash(DECOY_PASSWORD)?;
        Ok(verifier)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password into an Argon2id PHC string.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AuthError::Crypto(format!("password hash error: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verify a plaintext password against a stored PHC string.
    ///
    /// The comparison is constant-time. A malformed hash is reported
    /// as a mismatch.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                debug!(error = %e, "Password verification failed");
                false
            }
        }
    }

    /// Spend one verification on the decoy hash. The result is
    /// discarded.
    pub fn verify_decoy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, &self.decoy_hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Low-cost parameters so the test suite stays fast.
    fn verifier() -> CredentialVerifier {
        CredentialVerifier::new(&AuthConfig {
            jwt_secret: "unused".into(),
            hash_memory_kib: 1024,
            hash_iterations: 1,
            hash_parallelism: 1,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn correct_password_matches() {
        let v = verifier();
        let hash = v.hash("Secret1!").unwrap();
        assert!(v.verify("Secret1!", &hash));
    }

    #[test]
    fn wrong_password_does_not_match() {
        let v = verifier();
        let hash = v.hash("Secret1!").unwrap();
        assert!(!v.verify("Secret2!", &hash));
        assert!(!v.verify("", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        let v = verifier();
        let h1 = v.hash("Secret1!").unwrap();
        let h2 = v.hash("Secret1!").unwrap();
        assert_ne!(h1, h2);
        assert!(v.verify("Secret1!", &h1));
        assert!(v.verify("Secret1!", &h2));
    }

    #[test]
    fn hash_is_argon2id_phc_and_not_plaintext() {
        let v = verifier();
        let hash = v.hash("Secret1!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("Secret1!"));
    }

    #[test]
    fn malformed_hash_returns_false() {
        let v = verifier();
        assert!(!v.verify("pw", "not-a-hash"));
        assert!(!v.verify("pw", ""));
        assert!(!v.verify("pw", "$argon2id$v=19$garbage"));
    }

    #[test]
    fn hash_from_other_cost_still_verifies() {
        let cheap = verifier();
        let hash = cheap.hash("Secret1!").unwrap();
        let other = CredentialVerifier::new(&AuthConfig {
            hash_memory_kib: 2048,
            hash_iterations: 2,
            ..Default::default()
        })
        .unwrap();
        assert!(other.verify("Secret1!", &hash));
    }

    #[test]
    fn decoy_hash_is_a_real_hash() {
        let v = verifier();
        assert!(v.decoy_hash.starts_with("$argon2id$"));
        assert!(v.verify(DECOY_PASSWORD, &v.decoy_hash));
        v.verify_decoy("anything");
    }

    #[test]
    fn invalid_cost_is_rejected() {
        let result = CredentialVerifier::new(&AuthConfig {
            hash_memory_kib: 1,
            ..Default::default()
        });
        assert!(matches!(result, Err(AuthError::Crypto(_))));
    }
}
