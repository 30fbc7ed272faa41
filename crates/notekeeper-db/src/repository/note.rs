//! SurrealDB implementation of [`NoteRepository`].
//!
//! Each create, update and delete bumps the note's `version` and the
//! schema's events append the matching `note_version` row in the same
//! transaction. History outlives the note.

use chrono::{DateTime, Utc};
use notekeeper_core::error::NotekeeperResult;
use notekeeper_core::models::note::{
    CreateNote, Note, NoteVersion, UpdateNote, VersionOperation,
};
use notekeeper_core::repository::{NoteRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;

use super::sequence::next_id;
use crate::error::DbError;
use crate::retry::retry_on_conflict;

/// DB-side row struct for queries where the ID is already known.
#[derive(Debug, SurrealValue)]
struct NoteRow {
    user_id: i64,
    title: String,
    content: String,
    priority: i64,
    summary: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct NoteRowWithId {
    record_id: i64,
    user_id: i64,
    title: String,
    content: String,
    priority: i64,
    summary: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct NoteVersionRow {
    note_id: i64,
    user_id: i64,
    version: i64,
    title: String,
    content: String,
    priority: i64,
    operation: String,
    recorded_at: DateTime<Utc>,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_priority(raw: i64) -> Result<u8, DbError> {
    u8::try_from(raw).map_err(|_| DbError::Query(format!("invalid note priority: {raw}")))
}

impl NoteRow {
    fn into_note(self, id: i64) -> Result<Note, DbError> {
        Ok(Note {
            id,
            user_id: self.user_id,
            title: self.title,
            content: self.content,
            priority: parse_priority(self.priority)?,
            summary: self.summary,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl NoteRowWithId {
    fn try_into_note(self) -> Result<Note, DbError> {
        Ok(Note {
            id: self.record_id,
            user_id: self.user_id,
            title: self.title,
            content: self.content,
            priority: parse_priority(self.priority)?,
            summary: self.summary,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl NoteVersionRow {
    fn try_into_version(self) -> Result<NoteVersion, DbError> {
        let operation = VersionOperation::parse(&self.operation).ok_or_else(|| {
            DbError::Query(format!("unknown version operation: {}", self.operation))
        })?;
        let version = u32::try_from(self.version)
            .map_err(|_| DbError::Query(format!("invalid version number: {}", self.version)))?;
        Ok(NoteVersion {
            note_id: self.note_id,
            user_id: self.user_id,
            version,
            title: self.title,
            content: self.content,
            priority: parse_priority(self.priority)?,
            operation,
            recorded_at: self.recorded_at,
        })
    }
}

fn not_found(id: i64) -> DbError {
    DbError::NotFound {
        entity: "note".into(),
        id: id.to_string(),
    }
}

/// SurrealDB implementation of the Note repository.
pub struct SurrealNoteRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealNoteRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealNoteRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn try_create(&self, user_id: i64, input: &CreateNote) -> Result<Note, DbError> {
        let id = next_id(&self.db, "note").await?;

        let mut result = self
            .db
            .query(
                "CREATE type::record('note', $id) SET \
                 user_id = $user_id, title = $title, \
                 content = $content, priority = $priority, \
                 summary = NONE, version = 1",
            )
            .bind(("id", id))
            .bind(("user_id", user_id))
            .bind(("title", input.title.clone()))
            .bind(("content", input.content.clone()))
            .bind(("priority", i64::from(input.priority)))
            .await?
            .check()
            .map_err(|e| DbError::from_statement("note", e))?;

        let rows: Vec<NoteRow> = result.take(0)?;
        let note = rows
            .into_iter()
            .next()
            .ok_or_else(|| not_found(id))?
            .into_note(id)?;

        debug!(note_id = id, "Created note record");
        Ok(note)
    }

    async fn try_update(&self, user_id: i64, id: i64, input: &UpdateNote) -> Result<Note, DbError> {
        let mut result = self
            .db
            .query(
                "UPDATE type::record('note', $id) SET \
                 title = $title, content = $content, \
                 priority = $priority, version += 1, \
                 updated_at = time::now() \
                 WHERE user_id = $user_id",
            )
            .bind(("id", id))
            .bind(("user_id", user_id))
            .bind(("title", input.title.clone()))
            .bind(("content", input.content.clone()))
            .bind(("priority", i64::from(input.priority)))
            .await?
            .check()
            .map_err(|e| DbError::from_statement("note", e))?;

        let rows: Vec<NoteRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| not_found(id))?
            .into_note(id)
    }

    async fn try_set_summary(&self, user_id: i64, id: i64, summary: &str) -> Result<Note, DbError> {
        let mut result = self
            .db
            .query(
                "UPDATE type::record('note', $id) SET \
                 summary = $summary, updated_at = time::now() \
                 WHERE user_id = $user_id",
            )
            .bind(("id", id))
            .bind(("user_id", user_id))
            .bind(("summary", summary.to_string()))
            .await?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<NoteRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| not_found(id))?
            .into_note(id)
    }

    async fn try_delete(&self, user_id: i64, id: i64) -> Result<(), DbError> {
        let mut result = self
            .db
            .query(
                "DELETE type::record('note', $id) \
                 WHERE user_id = $user_id RETURN BEFORE",
            )
            .bind(("id", id))
            .bind(("user_id", user_id))
            .await?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<NoteRow> = result.take(0)?;
        if rows.is_empty() {
            return Err(not_found(id));
        }
        Ok(())
    }
}

impl<C: Connection> NoteRepository for SurrealNoteRepository<C> {
    async fn create(&self, user_id: i64, input: CreateNote) -> NotekeeperResult<Note> {
        Ok(retry_on_conflict("note.create", || self.try_create(user_id, &input)).await?)
    }

    async fn get(&self, user_id: i64, id: i64) -> NotekeeperResult<Note> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('note', $id) \
                 WHERE user_id = $user_id",
            )
            .bind(("id", id))
            .bind(("user_id", user_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NoteRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id))?;

        Ok(row.into_note(id)?)
    }

    async fn get_by_title(&self, user_id: i64, title: &str) -> NotekeeperResult<Note> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM note \
                 WHERE user_id = $user_id AND title = $title",
            )
            .bind(("user_id", user_id))
            .bind(("title", title.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NoteRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "note".into(),
            id: format!("title={title}"),
        })?;

        Ok(row.try_into_note()?)
    }

    async fn list(
        &self,
        user_id: i64,
        pagination: Pagination,
    ) -> NotekeeperResult<PaginatedResult<Note>> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM note \
                 WHERE user_id = $user_id GROUP ALL",
            )
            .bind(("user_id", user_id))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM note \
                 WHERE user_id = $user_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("user_id", user_id))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NoteRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_note())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn update(&self, user_id: i64, id: i64, input: UpdateNote) -> NotekeeperResult<Note> {
        Ok(retry_on_conflict("note.update", || self.try_update(user_id, id, &input)).await?)
    }

    async fn set_summary(&self, user_id: i64, id: i64, summary: String) -> NotekeeperResult<Note> {
        Ok(
            retry_on_conflict("note.set_summary", || {
                self.try_set_summary(user_id, id, &summary)
            })
            .await?,
        )
    }

    async fn delete(&self, user_id: i64, id: i64) -> NotekeeperResult<()> {
        Ok(retry_on_conflict("note.delete", || self.try_delete(user_id, id)).await?)
    }

    async fn history(
        &self,
        user_id: i64,
        id: i64,
        pagination: Pagination,
    ) -> NotekeeperResult<PaginatedResult<NoteVersion>> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM note_version \
                 WHERE note_id = $note_id AND user_id = $user_id \
                 GROUP ALL",
            )
            .bind(("note_id", id))
            .bind(("user_id", user_id))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT * FROM note_version \
                 WHERE note_id = $note_id AND user_id = $user_id \
                 ORDER BY version ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("note_id", id))
            .bind(("user_id", user_id))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NoteVersionRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_version())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
