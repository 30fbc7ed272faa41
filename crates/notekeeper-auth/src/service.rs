//! Authentication service — registration and login orchestration.

use notekeeper_core::error::{NotekeeperError, NotekeeperResult};
use notekeeper_core::models::user::{CreateUser, User};
use notekeeper_core::repository::UserRepository;
use tracing::info;
use validator::{Validate, ValidationError};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::gate::AccessGate;
use crate::password::CredentialVerifier;
use crate::token::{IdentityClaim, TokenAuthority};

/// Characters that satisfy the "special character" rule.
const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Registration request. Intentionally not `Debug`: it holds a
/// plaintext password.
#[derive(Clone, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 10, max = 50))]
    pub username: String,
    #[validate(email, length(min = 10, max = 50))]
    pub email: String,
    #[validate(
        length(min = 8, max = 50),
        custom(function = "validate_password_policy")
    )]
    pub password: String,
}

/// Login request.
#[derive(Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Password policy: at least one uppercase letter and one of
/// `@$!%*?&`, built only from ASCII letters, digits and those
/// specials.
pub fn validate_password_policy(password: &str) -> Result<(), ValidationError> {
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if allowed && has_upper && has_special {
        Ok(())
    } else {
        Err(ValidationError::new("password_policy").with_message(
            "password needs an uppercase letter and one of @$!%*?&, and no other symbols".into(),
        ))
    }
}

/// Authentication service.
///
/// Generic over the user repository so the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    verifier: CredentialVerifier,
    authority: TokenAuthority,
    gate: AccessGate,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: &AuthConfig) -> Result<Self, AuthError> {
        let verifier = CredentialVerifier::new(config)?;
        let authority = TokenAuthority::new(config)?;
        Ok(Self {
            user_repo,
            verifier,
            gate: AccessGate::new(authority.clone()),
            authority,
        })
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Create an account. The password is hashed before it reaches the
    /// repository.
    pub async fn register(&self, input: RegisterInput) -> NotekeeperResult<User> {
        input
            .validate()
            .map_err(|e| NotekeeperError::validation(e.to_string()))?;

        match self.user_repo.get_by_email(&input.email).await {
            Ok(_) => {
                return Err(NotekeeperError::AlreadyExists {
                    entity: "user".into(),
                });
            }
            Err(NotekeeperError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let password_hash = self.hash_password(input.password).await?;
        let user = self
            .user_repo
            .create(CreateUser {
                username: input.username,
                email: input.email,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "Registered user");
        Ok(user)
    }

    /// Check email + password and issue an access token.
    ///
    /// An unknown email and a wrong password produce the same
    /// [`NotekeeperError::AuthenticationFailed`].
    pub async fn login(&self, input: LoginInput) -> NotekeeperResult<LoginOutput> {
        let user = match self.user_repo.get_by_email(&input.email).await {
            Ok(user) => Some(user),
            Err(NotekeeperError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        let user = self
            .check_credentials(user, input.password)
            .await?
            .map_err(|e| {
                info!(reason = %e, "Login rejected");
                NotekeeperError::from(e)
            })?;

        let ttl = self.authority.default_ttl();
        let access_token = self.authority.issue(&user.email, user.id, ttl)?;

        info!(user_id = user.id, "User logged in");
        Ok(LoginOutput {
            access_token,
            token_type: "bearer",
            expires_in: ttl.num_seconds().max(0) as u64,
        })
    }

    /// Resolve the caller of a protected operation from its
    /// `Authorization` header.
    pub fn authenticate(&self, authorization: Option<&str>) -> NotekeeperResult<IdentityClaim> {
        self.gate.authorize(authorization)
    }

    async fn hash_password(&self, plaintext: String) -> NotekeeperResult<String> {
        let verifier = self.verifier.clone();
        tokio::task::spawn_blocking(move || verifier.hash(&plaintext))
            .await
            .map_err(|e| NotekeeperError::Internal(format!("hashing task failed: {e}")))?
            .map_err(NotekeeperError::from)
    }

    /// Runs on the blocking pool. Unknown accounts still pay for one
    /// verification against the decoy hash.
    async fn check_credentials(
        &self,
        user: Option<User>,
        password: String,
    ) -> NotekeeperResult<Result<User, AuthError>> {
        let verifier = self.verifier.clone();
        tokio::task::spawn_blocking(move || match user {
            Some(user) if verifier.verify(&password, &user.password_hash) => Ok(user),
            Some(_) => Err(AuthError::CredentialMismatch),
            None => {
                verifier.verify_decoy(&password);
                Err(AuthError::CredentialNotFound)
            }
        })
        .await
        .map_err(|e| NotekeeperError::Internal(format!("verification task failed: {e}")))
    }
}
