//! Storage trait and error types.
//!
//! Paths passed to a [`Storage`] are backend paths (e.g., `"docs/guide"`,
//! `"docs/guide/setup.md"`). Backends decide how they are anchored; the
//! filesystem backend resolves relative paths against its base directory.

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::event::{StorageEventReceiver, WatchHandle};

/// Kind of a directory entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

/// A direct child of a listed directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// File or directory name (e.g., "setup.md", "guide").
    pub name: String,
    /// Whether the entry is a file or a directory.
    pub kind: EntryKind,
}

impl Entry {
    /// Create a file entry.
    #[must_use]
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    /// Create a directory entry.
    #[must_use]
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }

    /// True if the entry is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// What went wrong, independent of the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Directory or document does not exist.
    NotFound,
    /// Access was refused.
    PermissionDenied,
    /// Path or pattern is malformed.
    InvalidPath,
    /// Anything else (watcher setup, bad encoding, ...).
    Other,
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "Not found",
            Self::PermissionDenied => "Permission denied",
            Self::InvalidPath => "Invalid path",
            Self::Other => "Error",
        })
    }
}

/// Error returned by [`Storage`] operations.
///
/// Displays as `[Backend] Kind: source (path: p)`, omitting the parts that
/// are not set.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Path the operation was called with.
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl StorageError {
    /// Create an error of the given kind with no context.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Shorthand for a `NotFound` error on `path`.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Classify an I/O error, keeping it as the source.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::InvalidInput => StorageErrorKind::InvalidPath,
            _ => StorageErrorKind::Other,
        };
        Self {
            kind,
            path,
            backend: None,
            source: Some(Box::new(err)),
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }
        write!(f, "{}", self.kind)?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|s| s as &(dyn Error + 'static))
    }
}

/// Read access to a tree of directories and Markdown documents.
///
/// Listing order is backend-defined; consumers must not rely on it.
pub trait Storage: Send + Sync {
    /// Check whether `path` is an existing directory.
    ///
    /// Errors count as "not a directory".
    fn is_dir(&self, path: &Path) -> bool;

    /// List the direct children of a directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directory doesn't exist or can't be read.
    fn list(&self, dir: &Path) -> Result<Vec<Entry>, StorageError>;

    /// Read a document's full content.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file doesn't exist or can't be read.
    fn read(&self, path: &Path) -> Result<String, StorageError>;

    /// Subscribe to document changes under `roots`.
    ///
    /// Events carry paths under one of the roots, in the same convention the
    /// roots were given in. Backends without change notification keep the
    /// default, which never yields an event.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if watching cannot be started.
    fn watch(&self, roots: &[PathBuf]) -> Result<(StorageEventReceiver, WatchHandle), StorageError> {
        let _ = roots;
        Ok((StorageEventReceiver::no_op(), WatchHandle::no_op()))
    }
}
