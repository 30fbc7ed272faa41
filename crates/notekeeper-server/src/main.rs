//! Notekeeper server — application entry point.

mod settings;

use anyhow::Context;
use notekeeper_auth::AuthService;
use notekeeper_db::DbManager;
use notekeeper_notes::{ChatCompletionSummarizer, NoteService};
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("notekeeper=info".parse()?))
        .json()
        .init();

    tracing::info!("Starting Notekeeper server...");

    let settings = Settings::from_env()?;
    tracing::debug!(?settings, "Loaded settings");

    let db = DbManager::connect(&settings.database)
        .await
        .context("failed to connect to SurrealDB")?;
    db.migrate()
        .await
        .context("failed to apply schema migrations")?;

    let _auth = AuthService::new(db.user_repository(), &settings.auth)
        .context("invalid authentication settings")?;
    let summarizer = ChatCompletionSummarizer::new(settings.summarizer.clone())
        .context("failed to build summarizer client")?;
    let _notes = NoteService::new(db.note_repository(), summarizer);

    tracing::info!(
        token_lifetime_secs = settings.auth.token_lifetime_secs,
        "Authentication core ready"
    );

    // Request handling is mounted by the embedding transport.
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    tracing::info!("Notekeeper server stopped.");
    Ok(())
}
