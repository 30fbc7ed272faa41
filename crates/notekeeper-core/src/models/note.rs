//! Note and note-history domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub priority: u8,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateNote {
    pub title: String,
    pub content: String,
    pub priority: u8,
}

/// Full replacement of the editable fields.
#[derive(Debug, Clone)]
pub struct UpdateNote {
    pub title: String,
    pub content: String,
    pub priority: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VersionOperation {
    Insert,
    Update,
    Delete,
}

impl VersionOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionOperation::Insert => "Insert",
            VersionOperation::Update => "Update",
            VersionOperation::Delete => "Delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Insert" => Some(VersionOperation::Insert),
            "Update" => Some(VersionOperation::Update),
            "Delete" => Some(VersionOperation::Delete),
            _ => None,
        }
    }
}

/// Snapshot of a note recorded on every insert, update and delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteVersion {
    pub note_id: i64,
    pub user_id: i64,
    /// 1-based, increasing per note.
    pub version: u32,
    pub title: String,
    pub content: String,
    pub priority: u8,
    pub operation: VersionOperation,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_names_parse_back() {
        for op in [
            VersionOperation::Insert,
            VersionOperation::Update,
            VersionOperation::Delete,
        ] {
            assert_eq!(VersionOperation::parse(op.as_str()), Some(op));
        }
        assert_eq!(VersionOperation::parse("insert"), None);
    }
}
