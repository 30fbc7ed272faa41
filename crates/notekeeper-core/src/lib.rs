//! Notekeeper Core — Shared domain models, repository traits, and the
//! crate-spanning error type.

pub mod error;
pub mod models;
pub mod repository;
