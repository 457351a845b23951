//! In-memory document store for testing and offline mode

use async_trait::async_trait;
use note_tagger_domain::format::collect_known_tags;
use note_tagger_domain::{DocumentError, DocumentFilter, DocumentStore};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory document store implementation
pub struct InMemoryDocumentStore {
    documents: RwLock<BTreeMap<String, String>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn with_documents<I, K, V>(documents: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let documents = documents
            .into_iter()
            .map(|(id, text)| (id.into(), text.into()))
            .collect();
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Insert or replace a document
    pub fn insert(&self, id: impl Into<String>, text: impl Into<String>) -> Result<(), DocumentError> {
        let mut documents = self.documents.write().map_err(lock_error)?;
        documents.insert(id.into(), text.into());
        Ok(())
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> DocumentError {
    DocumentError::Io(std::io::Error::other(e.to_string()))
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn read_document(&self, id: &str) -> Result<String, DocumentError> {
        let documents = self.documents.read().map_err(lock_error)?;
        documents
            .get(id)
            .cloned()
            .ok_or_else(|| DocumentError::NotFound(id.to_string()))
    }

    async fn write_document(&self, id: &str, text: &str) -> Result<(), DocumentError> {
        let mut documents = self.documents.write().map_err(lock_error)?;
        match documents.get_mut(id) {
            Some(existing) => {
                *existing = text.to_string();
                Ok(())
            }
            None => Err(DocumentError::NotFound(id.to_string())),
        }
    }

    async fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<String>, DocumentError> {
        let documents = self.documents.read().map_err(lock_error)?;
        Ok(documents
            .keys()
            .filter(|id| filter.matches(id))
            .cloned()
            .collect())
    }

    async fn known_tags(&self, id: &str) -> Result<Vec<String>, DocumentError> {
        let text = self.read_document(id).await?;
        Ok(collect_known_tags(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_write() {
        let store = InMemoryDocumentStore::with_documents([("a.md", "Alpha")]);

        store.write_document("a.md", "Alpha #tag").await.unwrap();
        assert_eq!(store.read_document("a.md").await.unwrap(), "Alpha #tag");
        assert_eq!(store.known_tags("a.md").await.unwrap(), vec!["tag"]);
    }

    #[tokio::test]
    async fn test_write_requires_existing() {
        let store = InMemoryDocumentStore::new();
        assert!(matches!(
            store.write_document("new.md", "x").await,
            Err(DocumentError::NotFound(_))
        ));

        store.insert("new.md", "x").unwrap();
        assert!(store.write_document("new.md", "y").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_sorted_and_filtered() {
        let store = InMemoryDocumentStore::with_documents([
            ("z.md", ""),
            ("notes/b.md", ""),
            ("notes/a.txt", ""),
            ("a.md", ""),
        ]);

        let ids = store.list_documents(&DocumentFilter::default()).await.unwrap();
        assert_eq!(ids, vec!["a.md", "notes/b.md", "z.md"]);

        let ids = store
            .list_documents(&DocumentFilter::in_folder("notes"))
            .await
            .unwrap();
        assert_eq!(ids, vec!["notes/b.md"]);
    }
}
