//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! Record IDs are integers handed out by the `_sequence` table.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- ID sequences
-- =======================================================================
DEFINE TABLE _sequence SCHEMAFULL;
DEFINE FIELD value ON TABLE _sequence TYPE int;
CREATE _sequence:user SET value = 0;
CREATE _sequence:note SET value = 0;

-- =======================================================================
-- Users (credential records)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user \
    COLUMNS email UNIQUE;

-- =======================================================================
-- Notes (owned by a user)
-- =======================================================================
DEFINE TABLE note SCHEMAFULL;
DEFINE FIELD user_id ON TABLE note TYPE int;
DEFINE FIELD title ON TABLE note TYPE string;
DEFINE FIELD content ON TABLE note TYPE string;
DEFINE FIELD priority ON TABLE note TYPE int \
    ASSERT $value >= 0 AND $value <= 100;
DEFINE FIELD summary ON TABLE note TYPE option<string>;
DEFINE FIELD version ON TABLE note TYPE int DEFAULT 1;
DEFINE FIELD created_at ON TABLE note TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE note TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_note_user_title ON TABLE note \
    COLUMNS user_id, title UNIQUE;
DEFINE INDEX idx_note_user ON TABLE note \
    COLUMNS user_id;

-- =======================================================================
-- Note versions (append-only history)
-- =======================================================================
DEFINE TABLE note_version SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD note_id ON TABLE note_version TYPE int;
DEFINE FIELD user_id ON TABLE note_version TYPE int;
DEFINE FIELD version ON TABLE note_version TYPE int;
DEFINE FIELD title ON TABLE note_version TYPE string;
DEFINE FIELD content ON TABLE note_version TYPE string;
DEFINE FIELD priority ON TABLE note_version TYPE int;
DEFINE FIELD operation ON TABLE note_version TYPE string \
    ASSERT $value IN ['Insert', 'Update', 'Delete'];
DEFINE FIELD recorded_at ON TABLE note_version TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_note_version ON TABLE note_version \
    COLUMNS note_id, version UNIQUE;
DEFINE INDEX idx_note_version_user ON TABLE note_version \
    COLUMNS user_id, note_id;

-- History rows are written by events so they commit together with the
-- note change. Summary updates leave `version` untouched and record
-- nothing.
DEFINE EVENT note_inserted ON TABLE note \
    WHEN $event = 'CREATE' THEN {
        CREATE note_version SET
            note_id = meta::id($after.id), user_id = $after.user_id,
            version = $after.version, title = $after.title,
            content = $after.content, priority = $after.priority,
            operation = 'Insert';
    };
DEFINE EVENT note_updated ON TABLE note \
    WHEN $event = 'UPDATE' AND $before.version != $after.version THEN {
        CREATE note_version SET
            note_id = meta::id($after.id), user_id = $after.user_id,
            version = $after.version, title = $after.title,
            content = $after.content, priority = $after.priority,
            operation = 'Update';
    };
DEFINE EVENT note_deleted ON TABLE note \
    WHEN $event = 'DELETE' THEN {
        CREATE note_version SET
            note_id = meta::id($before.id), user_id = $before.user_id,
            version = $before.version + 1, title = $before.title,
            content = $before.content, priority = $before.priority,
            operation = 'Delete';
    };
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
