//! Note service — CRUD, history and summarization for the caller
//! identified by a verified token.

use notekeeper_auth::IdentityClaim;
use notekeeper_core::error::{NotekeeperError, NotekeeperResult};
use notekeeper_core::models::note::{CreateNote, Note, NoteVersion, UpdateNote};
use notekeeper_core::repository::{NoteRepository, PaginatedResult, Pagination};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::summarizer::Summarizer;

/// Title, content and priority of a note, as submitted by a client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NoteInput {
    #[validate(length(min = 5, max = 100))]
    pub title: String,
    #[validate(length(min = 10, max = 100000))]
    pub content: String,
    #[serde(default)]
    #[validate(range(max = 100))]
    pub priority: u8,
}

/// Result of a summarization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    pub summary: String,
    /// `false` when an existing summary was returned without calling
    /// the model.
    pub generated: bool,
}

fn validated(input: NoteInput) -> NotekeeperResult<NoteInput> {
    input
        .validate()
        .map_err(|e| NotekeeperError::validation(e.to_string()))?;
    Ok(input)
}

pub struct NoteService<N: NoteRepository, S: Summarizer> {
    notes: N,
    summarizer: S,
}

impl<N: NoteRepository, S: Summarizer> NoteService<N, S> {
    pub fn new(notes: N, summarizer: S) -> Self {
        Self { notes, summarizer }
    }

    /// Create a note. Titles are unique per owner.
    pub async fn create(&self, caller: &IdentityClaim, input: NoteInput) -> NotekeeperResult<Note> {
        let input = validated(input)?;

        match self.notes.get_by_title(caller.user_id, &input.title).await {
            Ok(_) => {
                return Err(NotekeeperError::AlreadyExists {
                    entity: "note".into(),
                });
            }
            Err(NotekeeperError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let note = self
            .notes
            .create(
                caller.user_id,
                CreateNote {
                    title: input.title,
                    content: input.content,
                    priority: input.priority,
                },
            )
            .await?;

        info!(user_id = caller.user_id, note_id = note.id, "Created note");
        Ok(note)
    }

    pub async fn list(
        &self,
        caller: &IdentityClaim,
        page: u64,
        per_page: u64,
    ) -> NotekeeperResult<PaginatedResult<Note>> {
        let pagination = Pagination::page(page, per_page)?;
        self.notes.list(caller.user_id, pagination).await
    }

    pub async fn get(&self, caller: &IdentityClaim, id: i64) -> NotekeeperResult<Note> {
        self.notes.get(caller.user_id, id).await
    }

    pub async fn update(
        &self,
        caller: &IdentityClaim,
        id: i64,
        input: NoteInput,
    ) -> NotekeeperResult<Note> {
        let input = validated(input)?;
        let note = self
            .notes
            .update(
                caller.user_id,
                id,
                UpdateNote {
                    title: input.title,
                    content: input.content,
                    priority: input.priority,
                },
            )
            .await?;

        info!(user_id = caller.user_id, note_id = id, "Updated note");
        Ok(note)
    }

    pub async fn delete(&self, caller: &IdentityClaim, id: i64) -> NotekeeperResult<()> {
        self.notes.delete(caller.user_id, id).await?;
        info!(user_id = caller.user_id, note_id = id, "Deleted note");
        Ok(())
    }

    /// Recorded versions of a note, oldest first. Still available
    /// after the note itself has been deleted.
    pub async fn history(
        &self,
        caller: &IdentityClaim,
        id: i64,
        page: u64,
        per_page: u64,
    ) -> NotekeeperResult<PaginatedResult<NoteVersion>> {
        let pagination = Pagination::page(page, per_page)?;
        let history = self.notes.history(caller.user_id, id, pagination).await?;
        if history.total == 0 {
            return Err(NotekeeperError::not_found("note", id));
        }
        Ok(history)
    }

    /// Summarize a note once; later calls return the stored summary.
    pub async fn summarize(&self, caller: &IdentityClaim, id: i64) -> NotekeeperResult<SummaryOutcome> {
        let note = self.notes.get(caller.user_id, id).await?;
        if let Some(summary) = note.summary {
            return Ok(SummaryOutcome {
                summary,
                generated: false,
            });
        }

        let summary = self.summarizer.summarize(&note.content).await?;
        self.notes
            .set_summary(caller.user_id, id, summary.clone())
            .await?;

        info!(user_id = caller.user_id, note_id = id, "Summarized note");
        Ok(SummaryOutcome {
            summary,
            generated: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, content: &str, priority: u8) -> NoteInput {
        NoteInput {
            title: title.into(),
            content: content.into(),
            priority,
        }
    }

    #[test]
    fn valid_note_input() {
        assert!(input("Test Note", "This is a test note content.", 5)
            .validate()
            .is_ok());
        assert!(input("Edge!", "0123456789", 100).validate().is_ok());
    }

    #[test]
    fn invalid_note_input() {
        // Title too short.
        assert!(input("Tiny", "This is a test note content.", 5)
            .validate()
            .is_err());
        // Content too short.
        assert!(input("Test Note", "short", 5).validate().is_err());
        // Priority out of range.
        assert!(input("Test Note", "This is a test note content.", 101)
            .validate()
            .is_err());
        // Title too long.
        assert!(input(&"x".repeat(101), "This is a test note content.", 5)
            .validate()
            .is_err());
    }

    #[test]
    fn priority_defaults_to_zero() {
        let parsed: NoteInput =
            serde_json::from_str(r#"{"title":"Test Note","content":"This is a test note content."}"#)
                .unwrap();
        assert_eq!(parsed.priority, 0);
    }
}
