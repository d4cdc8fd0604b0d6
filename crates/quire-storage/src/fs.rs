//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading content documents from a local directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::{Document, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage implementation.
///
/// Scans a content directory recursively for files whose extension is in the
/// configured list. Hidden files and directories (leading `.`) are skipped.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use quire_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("content"));
/// let docs = storage.scan()?;
/// ```
#[derive(Debug)]
pub struct FsStorage {
    /// Root directory for content.
    source_dir: PathBuf,
    /// Accepted file extensions, without the leading dot.
    extensions: Vec<String>,
}

impl FsStorage {
    /// Create a new filesystem storage accepting markdown files.
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self::with_extensions(source_dir, vec!["md".to_owned()])
    }

    /// Create a new filesystem storage accepting the given extensions.
    #[must_use]
    pub fn with_extensions(source_dir: PathBuf, extensions: Vec<String>) -> Self {
        Self {
            source_dir,
            extensions,
        }
    }

    /// Root directory this storage reads from.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Validate that a path doesn't escape the source directory.
    fn validate_path(path: &Path) -> Result<(), StorageError> {
        let escapes = path.components().any(|c| {
            matches!(
                c,
                std::path::Component::ParentDir
                    | std::path::Component::RootDir
                    | std::path::Component::Prefix(_)
            )
        });

        if escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|accepted| accepted == ext))
    }

    /// Scan directory recursively and collect documents.
    fn scan_directory(&self, dir_path: &Path, base_path: &Path, documents: &mut Vec<Document>) {
        let entries = match fs::read_dir(dir_path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir_path.display(), error = %e, "Failed to read directory");
                return;
            }
        };

        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }

            let rel_path = base_path.join(&name);
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                self.scan_directory(&entry.path(), &rel_path, documents);
            } else if self.accepts(&rel_path) {
                documents.push(Document::new(rel_path));
            }
        }
    }
}

impl Storage for FsStorage {
    fn scan(&self) -> Result<Vec<Document>, StorageError> {
        if !self.source_dir.exists() {
            return Ok(Vec::new());
        }
        if !self.source_dir.is_dir() {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(&self.source_dir)
                .with_backend(BACKEND));
        }

        let mut documents = Vec::new();
        self.scan_directory(&self.source_dir, Path::new(""), &mut documents);
        documents.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!(count = documents.len(), dir = %self.source_dir.display(), "Scanned content");
        Ok(documents)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        Self::validate_path(path)?;
        let full_path = self.source_dir.join(path);
        fs::read_to_string(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))
    }

    fn exists(&self, path: &Path) -> bool {
        Self::validate_path(path).is_ok() && self.source_dir.join(path).is_file()
    }
}
