//! SurrealDB repository implementations.

mod note;
mod sequence;
mod user;

pub use note::SurrealNoteRepository;
pub use user::SurrealUserRepository;
