//! Notekeeper Auth — Password hashing, JWT issuance/validation, the
//! bearer-token access gate, and registration/login orchestration.

pub mod config;
pub mod error;
pub mod gate;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use gate::AccessGate;
pub use password::CredentialVerifier;
pub use service::{AuthService, LoginInput, LoginOutput, RegisterInput};
pub use token::{IdentityClaim, TokenAuthority};
