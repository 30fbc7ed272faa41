//! SurrealDB implementation of [`UserRepository`].
//!
//! Passwords arrive already hashed; this repository never sees a
//! plaintext.

use chrono::{DateTime, Utc};
use notekeeper_core::error::NotekeeperResult;
use notekeeper_core::models::user::{CreateUser, User};
use notekeeper_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;

use super::sequence::next_id;
use crate::error::DbError;
use crate::retry::retry_on_conflict;

/// DB-side row struct for queries where the ID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: i64,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn not_found(id: i64) -> DbError {
    DbError::NotFound {
        entity: "user".into(),
        id: id.to_string(),
    }
}

impl UserRow {
    fn into_user(self, id: i64) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<UserRowWithId> for User {
    fn from(row: UserRowWithId) -> Self {
        User {
            id: row.record_id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// SurrealDB implementation of the User repository.
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealUserRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn try_create(&self, input: &CreateUser) -> Result<User, DbError> {
        let id = next_id(&self.db, "user").await?;

        let mut result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 username = $username, email = $email, \
                 password_hash = $password_hash",
            )
            .bind(("id", id))
            .bind(("username", input.username.clone()))
            .bind(("email", input.email.clone()))
            .bind(("password_hash", input.password_hash.clone()))
            .await?
            .check()
            .map_err(|e| DbError::from_statement("user", e))?;

        let rows: Vec<UserRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id))?;

        debug!(user_id = id, "Created user record");
        Ok(row.into_user(id))
    }

    /// Remove the user, their notes and all note history in one
    /// transaction.
    async fn try_delete(&self, id: i64) -> Result<(), DbError> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id))
            .await?;
        let existing: Vec<UserRow> = result.take(0)?;
        if existing.is_empty() {
            return Err(not_found(id));
        }

        // Notes go before their history: deleting a note appends a
        // final version row.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE note WHERE user_id = $id RETURN NONE; \
                 DELETE note_version WHERE user_id = $id RETURN NONE; \
                 DELETE type::record('user', $id) RETURN NONE; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id))
            .await?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        debug!(user_id = id, "Deleted user record and owned notes");
        Ok(())
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> NotekeeperResult<User> {
        Ok(retry_on_conflict("user.create", || self.try_create(&input)).await?)
    }

    async fn get_by_id(&self, id: i64) -> NotekeeperResult<User> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id))?;

        Ok(row.into_user(id))
    }

    async fn get_by_email(&self, email: &str) -> NotekeeperResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.into())
    }

    /// Hard delete, cascading to the user's notes and their history.
    /// Tokens already issued to the user stay valid until they expire.
    async fn delete(&self, id: i64) -> NotekeeperResult<()> {
        Ok(retry_on_conflict("user.delete", || self.try_delete(id)).await?)
    }
}
