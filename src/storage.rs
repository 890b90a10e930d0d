//! Storage layer for the task document
//!
//! One JSON file holds the whole store; a sibling `.lock` file serializes
//! writers:
//!
//! ```text
//! data/
//!   db.json         # tasks + _meta, replaced atomically on every mutation
//!   db.json.lock    # advisory lock held across read-modify-write
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::lock::{self, lock_path_for};
use crate::task::Document;

/// Default location of the backing document, relative to the working directory
pub const DEFAULT_DOCUMENT_PATH: &str = "data/db.json";

/// Reads and writes the backing document file
#[derive(Debug, Clone)]
pub struct DocumentFile {
    path: PathBuf,
}

impl DocumentFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to the document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path to the writer lock guarding the document
    pub fn lock_path(&self) -> PathBuf {
        lock_path_for(&self.path)
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Create the directory that holds the document
    pub fn ensure_dir(&self) -> Result<()> {
        let Some(parent) = self.path.parent() else {
            return Ok(());
        };
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(parent).map_err(|source| Error::StorageUnavailable {
            path: parent.to_path_buf(),
            source,
        })
    }

    /// Read and parse the document
    pub fn load(&self) -> Result<Document> {
        let content = fs::read_to_string(&self.path).map_err(|source| match source.kind() {
            io::ErrorKind::InvalidData => Error::CorruptData {
                path: self.path.clone(),
                reason: "file is not valid UTF-8".to_string(),
            },
            _ => Error::StorageUnavailable {
                path: self.path.clone(),
                source,
            },
        })?;

        let document: Document =
            serde_json::from_str(&content).map_err(|err| Error::CorruptData {
                path: self.path.clone(),
                reason: err.to_string(),
            })?;

        document.validate().map_err(|reason| Error::CorruptData {
            path: self.path.clone(),
            reason,
        })?;

        tracing::debug!(
            path = %self.path.display(),
            tasks = document.tasks.len(),
            "loaded task document"
        );
        Ok(document)
    }

    /// Replace the document on disk (atomic)
    ///
    /// Readers never see a partial write; on failure the previous document
    /// stays in place.
    pub fn persist(&self, document: &Document) -> Result<()> {
        let json = serde_json::to_string_pretty(document)?;
        lock::write_atomic(&self.path, json.as_bytes()).map_err(|source| {
            Error::PersistenceFailure {
                path: self.path.clone(),
                source,
            }
        })?;

        tracing::debug!(
            path = %self.path.display(),
            tasks = document.tasks.len(),
            "persisted task document"
        );
        Ok(())
    }

    /// Write a fresh document; any failure means the location is unusable
    pub fn create(&self, document: &Document) -> Result<()> {
        self.persist(document).map_err(|err| match err {
            Error::PersistenceFailure { path, source } => {
                Error::StorageUnavailable { path, source }
            }
            other => other,
        })
    }
}
