//! SurrealDB connection for the Notekeeper service.

use std::fmt;
use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::repository::{SurrealNoteRepository, SurrealUserRepository};
use crate::schema::run_migrations;

/// Where the notes store lives and how to sign in to it.
#[derive(Clone)]
pub struct DbConfig {
    /// WebSocket address, e.g. `127.0.0.1:8000`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
    /// Upper bound for connecting, signing in and selecting the
    /// database.
    pub connect_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "notekeeper".into(),
            database: "notes".into(),
            username: "root".into(),
            password: "root".into(),
            connect_timeout_secs: 10,
        }
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.url)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Live connection to the notes store. Cloning shares the connection.
#[derive(Clone, Debug)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect, sign in as root and select the configured database,
    /// giving up after `connect_timeout_secs`.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let timeout = Duration::from_secs(config.connect_timeout_secs);
        let db = tokio::time::timeout(timeout, Self::open(config))
            .await
            .map_err(|_| {
                DbError::Unavailable(format!(
                    "no connection to {} within {}s",
                    config.url, config.connect_timeout_secs
                ))
            })??;

        info!("Connected to SurrealDB");
        Ok(Self { db })
    }

    async fn open(config: &DbConfig) -> Result<Surreal<Client>, DbError> {
        let db = Surreal::new::<Ws>(config.url.as_str()).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;
        Ok(db)
    }

    /// Bring the schema up to date.
    pub async fn migrate(&self) -> Result<(), DbError> {
        run_migrations(&self.db).await
    }

    pub fn user_repository(&self) -> SurrealUserRepository<Client> {
        SurrealUserRepository::new(self.db.clone())
    }

    pub fn note_repository(&self) -> SurrealNoteRepository<Client> {
        SurrealNoteRepository::new(self.db.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_password() {
        let config = DbConfig {
            password: "hunter2-surreal".into(),
            ..Default::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2-surreal"));
        assert!(printed.contains("<redacted>"));
    }

    #[tokio::test]
    async fn unreachable_server_times_out() {
        let config = DbConfig {
            // TEST-NET-1, never routed.
            url: "192.0.2.1:8000".into(),
            connect_timeout_secs: 1,
            ..Default::default()
        };
        let err = DbManager::connect(&config).await.unwrap_err();
        assert!(matches!(err, DbError::Unavailable(_) | DbError::Surreal(_)));
    }
}
