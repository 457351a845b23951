//! JSON file persistence for tag history

use note_tagger_domain::history::{HistoryError, TagHistory};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryFileError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// History stored as the exported JSON list
#[derive(Debug, Clone)]
pub struct JsonHistoryFile {
    path: PathBuf,
}

impl JsonHistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the history; a missing file is an empty history
    pub async fn load(&self) -> Result<TagHistory, HistoryFileError> {
        let mut history = TagHistory::new();
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => {
                history.import_json(&data)?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(HistoryFileError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        }
        Ok(history)
    }

    pub async fn save(&self, history: &TagHistory) -> Result<(), HistoryFileError> {
        let data = history.export_json()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }
        tokio::fs::write(&self.path, data)
            .await
            .map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> HistoryFileError {
        HistoryFileError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
