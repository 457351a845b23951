//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::GenerationResult;

/// Error type for tag generation
///
/// These never escape a generation call: providers and the generator render
/// them into [`GenerationResult::error`].
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("API key not configured for provider {0}")]
    ProviderNotConfigured(String),
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Timeout")]
    Timeout,
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
    #[error("Content too short for tag generation ({len} < {min} characters)")]
    ContentTooShort { len: usize, min: usize },
}

/// Port for a text-generation backend that proposes tags
#[async_trait]
pub trait TagProvider: Send + Sync {
    /// Provider identifier reported in results (e.g., "openai")
    fn id(&self) -> &str;

    /// Generate tag suggestions for already-cleaned content
    ///
    /// `{content}` in `prompt_template` is replaced with `content`. Results are
    /// truncated to `max_tags`. Must resolve to a result rather than fail.
    async fn generate_tags(
        &self,
        content: &str,
        prompt_template: &str,
        max_tags: usize,
    ) -> GenerationResult;
}

/// Error type for document storage
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Invalid document id '{0}'")]
    InvalidId(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Selection of documents for listing
#[derive(Debug, Clone)]
pub struct DocumentFilter {
    /// Only documents under this folder (relative, `/`-separated)
    pub folder: Option<String>,
    /// File extension without the dot
    pub extension: String,
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self {
            folder: None,
            extension: "md".to_string(),
        }
    }
}

impl DocumentFilter {
    pub fn in_folder(folder: impl Into<String>) -> Self {
        Self {
            folder: Some(folder.into()),
            ..Self::default()
        }
    }

    /// Check whether a `/`-separated document id passes the filter
    pub fn matches(&self, id: &str) -> bool {
        let extension_ok = id
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(&self.extension));

        let folder_ok = match self.folder.as_deref().map(|f| f.trim_matches('/')) {
            None | Some("") => true,
            Some(folder) => id
                .strip_prefix(folder)
                .is_some_and(|rest| rest.starts_with('/')),
        };

        extension_ok && folder_ok
    }
}

/// Port for the host document collection
///
/// Each call is atomic; the domain performs no read-modify-write of its own.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a document's full text
    async fn read_document(&self, id: &str) -> Result<String, DocumentError>;

    /// Replace a document's full text
    async fn write_document(&self, id: &str, text: &str) -> Result<(), DocumentError>;

    /// List document ids, sorted
    async fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<String>, DocumentError>;

    /// Tags the host already knows for a document
    async fn known_tags(&self, id: &str) -> Result<Vec<String>, DocumentError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
