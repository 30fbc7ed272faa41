//! Process settings, read from the environment.
//!
//! In debug builds a `.env` file in the working directory is loaded
//! first.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, Result};
use notekeeper_auth::AuthConfig;
use notekeeper_db::DbConfig;
use notekeeper_notes::SummarizerConfig;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Settings {
    pub auth: AuthConfig,
    pub database: DbConfig,
    pub summarizer: SummarizerConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        if cfg!(debug_assertions) && dotenvy::dotenv().is_ok() {
            info!("Loaded .env file for development");
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let auth_defaults = AuthConfig::default();
        let db_defaults = DbConfig::default();
        let summarizer_defaults = SummarizerConfig::default();

        let jwt_secret = lookup("NOTEKEEPER_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .context("NOTEKEEPER_JWT_SECRET must be set")?;

        let auth = AuthConfig {
            jwt_secret,
            token_lifetime_secs: parsed(
                &lookup,
                "NOTEKEEPER_TOKEN_LIFETIME_SECS",
                auth_defaults.token_lifetime_secs,
            )?,
            hash_memory_kib: parsed(
                &lookup,
                "NOTEKEEPER_HASH_MEMORY_KIB",
                auth_defaults.hash_memory_kib,
            )?,
            hash_iterations: parsed(
                &lookup,
                "NOTEKEEPER_HASH_ITERATIONS",
                auth_defaults.hash_iterations,
            )?,
            hash_parallelism: parsed(
                &lookup,
                "NOTEKEEPER_HASH_PARALLELISM",
                auth_defaults.hash_parallelism,
            )?,
        };

        let database = DbConfig {
            url: lookup("SURREAL_URL").unwrap_or(db_defaults.url),
            namespace: lookup("SURREAL_NAMESPACE").unwrap_or(db_defaults.namespace),
            database: lookup("SURREAL_DATABASE").unwrap_or(db_defaults.database),
            username: lookup("SURREAL_USERNAME").unwrap_or(db_defaults.username),
            password: lookup("SURREAL_PASSWORD").unwrap_or(db_defaults.password),
            connect_timeout_secs: parsed(
                &lookup,
                "SURREAL_CONNECT_TIMEOUT_SECS",
                db_defaults.connect_timeout_secs,
            )?,
        };

        let summarizer = SummarizerConfig {
            api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
            base_url: lookup("OPENAI_BASE_URL").unwrap_or(summarizer_defaults.base_url),
            model: lookup("OPENAI_MODEL").unwrap_or(summarizer_defaults.model),
            timeout_secs: summarizer_defaults.timeout_secs,
        };

        Ok(Self {
            auth,
            database,
            summarizer,
        })
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid {name}")),
        None => Ok(default),
    }
}
