//! Filesystem document store over a folder of markdown notes

use async_trait::async_trait;
use note_tagger_domain::format::collect_known_tags;
use note_tagger_domain::{DocumentError, DocumentFilter, DocumentStore};
use std::path::{Component, Path, PathBuf};

/// Documents are files under `root`, addressed by `/`-separated relative paths
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let root = root.as_ref().to_path_buf();

        if !root.is_dir() {
            return Err(DocumentError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Document folder not found: {}", root.display()),
            )));
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an id to a path, rejecting anything that escapes the root
    fn resolve(&self, id: &str) -> Result<PathBuf, DocumentError> {
        let relative = Path::new(id);
        let valid = !id.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(DocumentError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Map a path under the root back to its id
    pub fn id_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn read_document(&self, id: &str) -> Result<String, DocumentError> {
        let path = self.resolve(id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DocumentError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, id: &str, text: &str) -> Result<(), DocumentError> {
        let path = self.resolve(id)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(DocumentError::NotFound(id.to_string()));
        }
        tokio::fs::write(&path, text).await?;
        tracing::debug!(document = %id, bytes = text.len(), "Wrote document");
        Ok(())
    }

    async fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<String>, DocumentError> {
        let mut ids = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                let Some(name) = name.to_str() else { continue };
                if is_hidden(name) {
                    continue;
                }

                let path = entry.path();
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    if let Some(id) = self.id_for(&path) {
                        if filter.matches(&id) {
                            ids.push(id);
                        }
                    }
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    async fn known_tags(&self, id: &str) -> Result<Vec<String>, DocumentError> {
        let text = self.read_document(id).await?;
        Ok(collect_known_tags(&text))
    }
}
