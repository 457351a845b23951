//! note-tagger adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `llm`: Generation backends (chat-completion, messages, local-generate, stub)
//! - `documents`: Filesystem and in-memory document stores
//! - `history`: JSON file persistence for tag history

mod documents_fs;
mod documents_memory;
mod history_fs;

pub mod llm;

/// Re-exports for document store adapters
pub mod documents {
    pub use crate::documents_fs::FsDocumentStore;
    pub use crate::documents_memory::InMemoryDocumentStore;
}

/// Re-exports for history persistence
pub mod history {
    pub use crate::history_fs::{HistoryFileError, JsonHistoryFile};
}
