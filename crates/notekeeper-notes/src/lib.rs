//! Notekeeper Notes — Note CRUD, version history and LLM
//! summarization, scoped to the caller's verified identity.

pub mod service;
pub mod summarizer;

pub use service::{NoteInput, NoteService, SummaryOutcome};
pub use summarizer::{ChatCompletionSummarizer, Summarizer, SummarizerConfig};
