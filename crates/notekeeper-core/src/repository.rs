//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Note repositories take the
//! owning `user_id` on every call so one user can never reach another
//! user's notes.

use crate::error::{NotekeeperError, NotekeeperResult};
use crate::models::{
    note::{CreateNote, Note, NoteVersion, UpdateNote},
    user::{CreateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

impl Pagination {
    /// Build from 1-based page numbering. Both values must be positive.
    pub fn page(page: u64, per_page: u64) -> NotekeeperResult<Self> {
        if page == 0 || per_page == 0 {
            return Err(NotekeeperError::validation(
                "page and per_page must be greater than zero",
            ));
        }
        let offset = (page - 1)
            .checked_mul(per_page)
            .ok_or_else(|| NotekeeperError::validation("page is out of range"))?;
        Ok(Self {
            offset,
            limit: per_page,
        })
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = NotekeeperResult<User>> + Send;
    fn get_by_id(&self, id: i64) -> impl Future<Output = NotekeeperResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = NotekeeperResult<User>> + Send;
    fn delete(&self, id: i64) -> impl Future<Output = NotekeeperResult<()>> + Send;
}

pub trait NoteRepository: Send + Sync {
    fn create(
        &self,
        user_id: i64,
        input: CreateNote,
    ) -> impl Future<Output = NotekeeperResult<Note>> + Send;
    fn get(&self, user_id: i64, id: i64) -> impl Future<Output = NotekeeperResult<Note>> + Send;
    fn get_by_title(
        &self,
        user_id: i64,
        title: &str,
    ) -> impl Future<Output = NotekeeperResult<Note>> + Send;
    fn list(
        &self,
        user_id: i64,
        pagination: Pagination,
    ) -> impl Future<Output = NotekeeperResult<PaginatedResult<Note>>> + Send;
    fn update(
        &self,
        user_id: i64,
        id: i64,
        input: UpdateNote,
    ) -> impl Future<Output = NotekeeperResult<Note>> + Send;
    fn set_summary(
        &self,
        user_id: i64,
        id: i64,
        summary: String,
    ) -> impl Future<Output = NotekeeperResult<Note>> + Send;
    fn delete(&self, user_id: i64, id: i64) -> impl Future<Output = NotekeeperResult<()>> + Send;
    /// Recorded versions of a note, oldest first.
    fn history(
        &self,
        user_id: i64,
        id: i64,
        pagination: Pagination,
    ) -> impl Future<Output = NotekeeperResult<PaginatedResult<NoteVersion>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_starts_at_zero() {
        let p = Pagination::page(1, 10).unwrap();
        assert_eq!(p, Pagination { offset: 0, limit: 10 });
    }

    #[test]
    fn later_pages_skip_previous_items() {
        let p = Pagination::page(3, 25).unwrap();
        assert_eq!(p.offset, 50);
        assert_eq!(p.limit, 25);
    }

    #[test]
    fn zero_page_or_size_is_rejected() {
        assert!(matches!(
            Pagination::page(0, 10),
            Err(NotekeeperError::Validation { .. })
        ));
        assert!(matches!(
            Pagination::page(1, 0),
            Err(NotekeeperError::Validation { .. })
        ));
    }
}
