//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, mpsc};

use crate::event::{StorageEvent, StorageEventKind, StorageEventReceiver, WatchHandle};
use crate::storage::{Entry, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores files in memory. Directories exist implicitly for every ancestor of
/// a file, or explicitly via [`with_dir`](Self::with_dir).
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use wikinav_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("docs/guide.md", "---\ntitle: Guide\n---\n");
///
/// let entries = storage.list(Path::new("docs")).unwrap();
/// let content = storage.read(Path::new("docs/guide.md")).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<BTreeMap<PathBuf, String>>,
    dirs: RwLock<BTreeSet<PathBuf>>,
    unreadable: RwLock<HashSet<PathBuf>>,
    event_sender: RwLock<Option<mpsc::Sender<StorageEvent>>>,
    watched_roots: RwLock<Vec<PathBuf>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content, creating its parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path: PathBuf = path.into();
        if let Some(parent) = path.parent() {
            self.insert_dir_chain(parent);
        }
        self.files.write().unwrap().insert(path, content.into());
        self
    }

    /// Add an (possibly empty) directory and its ancestors.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.insert_dir_chain(&path.into());
        self
    }

    /// Add a file that is listed but fails to read.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_unreadable_file(self, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        self.unreadable.write().unwrap().insert(path.clone());
        self.with_file(path, "")
    }

    /// Add a directory that exists but fails to list.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_unreadable_dir(self, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        self.unreadable.write().unwrap().insert(path.clone());
        self.with_dir(path)
    }

    /// Replace or add a file after construction.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn put_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path: PathBuf = path.into();
        if let Some(parent) = path.parent() {
            self.insert_dir_chain(parent);
        }
        self.files.write().unwrap().insert(path, content.into());
    }

    /// Remove a file after construction. Parent directories are kept.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.files.write().unwrap().remove(path.as_ref());
    }

    /// Roots passed to the most recent `watch()` call.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn watched_roots(&self) -> Vec<PathBuf> {
        self.watched_roots.read().unwrap().clone()
    }

    /// Emit a storage event.
    ///
    /// Only works if `watch()` has been called first.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn emit(&self, event: StorageEvent) {
        if let Some(sender) = self.event_sender.read().unwrap().as_ref() {
            let _ = sender.send(event);
        }
    }

    /// Emit a Created event.
    pub fn emit_created(&self, path: impl Into<PathBuf>) {
        self.emit(StorageEvent {
            path: path.into(),
            kind: StorageEventKind::Created,
        });
    }

    /// Emit a Modified event.
    pub fn emit_modified(&self, path: impl Into<PathBuf>) {
        self.emit(StorageEvent {
            path: path.into(),
            kind: StorageEventKind::Modified,
        });
    }

    /// Emit a Removed event.
    pub fn emit_removed(&self, path: impl Into<PathBuf>) {
        self.emit(StorageEvent {
            path: path.into(),
            kind: StorageEventKind::Removed,
        });
    }

    /// Drop the event sender, ending iteration on the watch receiver.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn close_watch(&self) {
        self.event_sender.write().unwrap().take();
    }

    fn check_readable(&self, path: &Path) -> Result<(), StorageError> {
        if self.unreadable.read().unwrap().contains(path) {
            return Err(StorageError::new(StorageErrorKind::PermissionDenied)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    fn insert_dir_chain(&self, dir: &Path) {
        let mut dirs = self.dirs.write().unwrap();
        for ancestor in dir.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }
}

impl Storage for MockStorage {
    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.read().unwrap().contains(path)
    }

    fn list(&self, dir: &Path) -> Result<Vec<Entry>, StorageError> {
        if !self.is_dir(dir) {
            return Err(StorageError::not_found(dir).with_backend(BACKEND));
        }
        self.check_readable(dir)?;

        let child_name = |path: &Path| {
            (path.parent() == Some(dir))
                .then(|| path.file_name())
                .flatten()
                .map(|name| name.to_string_lossy().into_owned())
        };

        let mut entries: Vec<Entry> = self
            .dirs
            .read()
            .unwrap()
            .iter()
            .filter_map(|path| child_name(path))
            .map(Entry::directory)
            .collect();
        entries.extend(
            self.files
                .read()
                .unwrap()
                .keys()
                .filter_map(|path| child_name(path))
                .map(Entry::file),
        );
        // Reverse so consumers can't accidentally depend on sorted listings
        entries.reverse();
        Ok(entries)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        self.check_readable(path)?;
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn watch(&self, roots: &[PathBuf]) -> Result<(StorageEventReceiver, WatchHandle), StorageError> {
        let (tx, rx) = mpsc::channel();
        let (shutdown_tx, _shutdown_rx) = mpsc::channel();
        *self.event_sender.write().unwrap() = Some(tx);
        *self.watched_roots.write().unwrap() = roots.to_vec();
        Ok((StorageEventReceiver::new(rx), WatchHandle::new(shutdown_tx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(entries: &[Entry]) -> Vec<String> {
        let mut names: Vec<_> = entries.iter().map(|e| e.name.clone()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_list_direct_children_only() {
        let storage = MockStorage::new()
            .with_file("docs/a.md", "A")
            .with_file("docs/sub/b.md", "B")
            .with_file("other/c.md", "C");

        let entries = storage.list(Path::new("docs")).unwrap();

        assert_eq!(names(&entries), vec!["a.md", "sub"]);
        let sub = entries.iter().find(|e| e.name == "sub").unwrap();
        assert!(sub.is_dir());
    }

    #[test]
    fn test_list_missing_dir_is_not_found() {
        let storage = MockStorage::new();

        let err = storage.list(Path::new("docs")).unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Mock"));
    }

    #[test]
    fn test_with_dir_creates_empty_directory() {
        let storage = MockStorage::new().with_dir("docs/empty");

        assert!(storage.is_dir(Path::new("docs")));
        assert!(storage.list(Path::new("docs/empty")).unwrap().is_empty());
    }

    #[test]
    fn test_read_and_unreadable() {
        let storage = MockStorage::new()
            .with_file("docs/a.md", "content")
            .with_unreadable_file("docs/locked.md");

        assert_eq!(storage.read(Path::new("docs/a.md")).unwrap(), "content");
        let err = storage.read(Path::new("docs/locked.md")).unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::PermissionDenied);
    }

    #[test]
    fn test_unreadable_dir_exists_but_fails_to_list() {
        let storage = MockStorage::new().with_unreadable_dir("docs/locked");

        assert!(storage.is_dir(Path::new("docs/locked")));
        let err = storage.list(Path::new("docs/locked")).unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::PermissionDenied);
        assert_eq!(names(&storage.list(Path::new("docs")).unwrap()), vec!["locked"]);
    }

    #[test]
    fn test_put_and_remove_file() {
        let storage = MockStorage::new().with_dir("docs");

        storage.put_file("docs/new.md", "new");
        assert_eq!(storage.read(Path::new("docs/new.md")).unwrap(), "new");

        storage.remove_file("docs/new.md");
        assert!(storage.read(Path::new("docs/new.md")).is_err());
        assert!(storage.is_dir(Path::new("docs")));
    }

    #[test]
    fn test_watch_delivers_emitted_events() {
        let storage = MockStorage::new();
        let (rx, _handle) = storage.watch(&[PathBuf::from("docs")]).unwrap();

        storage.emit_modified("docs/a.md");
        storage.close_watch();

        assert_eq!(
            rx.recv().map(|event| event.kind),
            Some(StorageEventKind::Modified)
        );
        assert!(rx.recv().is_none());
        assert_eq!(storage.watched_roots(), vec![PathBuf::from("docs")]);
    }
}
