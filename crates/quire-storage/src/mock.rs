//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::storage::{Document, Storage, StorageError};

/// Mock storage for testing.
///
/// Stores documents in memory, keyed by path. Use the builder methods
/// to configure the mock with test data.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use quire_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("blog/post.md", "---\ntitle: Post\n---\nBody");
///
/// let docs = storage.scan().unwrap();
/// let content = storage.read(Path::new("blog/post.md")).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: BTreeMap<PathBuf, String>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document with its full text.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

impl Storage for MockStorage {
    fn scan(&self) -> Result<Vec<Document>, StorageError> {
        Ok(self.files.keys().cloned().map(Document::new).collect())
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend("Mock"))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}
