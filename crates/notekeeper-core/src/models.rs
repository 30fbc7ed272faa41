//! Domain models for Notekeeper.

pub mod note;
pub mod user;
