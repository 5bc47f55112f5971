//! Filesystem storage implementation for the wikinav sidebar generator.
//!
//! This crate provides [`FsStorage`], a filesystem-based implementation of the
//! [`Storage`](wikinav_storage::Storage) trait. It handles:
//!
//! - Directory listing and document reads relative to a base directory
//! - File watching of sidebar roots with glob filtering
//! - Event debouncing so one save produces one change event
//!
//! # Example
//!
//! ```ignore
//! use std::path::{Path, PathBuf};
//! use wikinav_storage::Storage;
//! use wikinav_storage_fs::FsStorage;
//!
//! let storage = FsStorage::new(PathBuf::from("."));
//! for entry in storage.list(Path::new("docs"))? {
//!     println!("{}", entry.name);
//! }
//! ```

mod debouncer;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use glob::Pattern;
use notify::{RecursiveMode, Watcher};

use debouncer::EventDebouncer;
use wikinav_storage::{
    Entry, Storage, StorageError, StorageErrorKind, StorageEvent, StorageEventKind,
    StorageEventReceiver, WatchHandle,
};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Default glob pattern for watched documents.
const DEFAULT_WATCH_PATTERN: &str = "**/*.md";

/// Default debounce window for change events.
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// How often the drain thread polls the debouncer.
const DRAIN_INTERVAL: Duration = Duration::from_millis(50);

/// Create a storage error from a notify error.
fn notify_error(e: notify::Error) -> StorageError {
    StorageError::new(StorageErrorKind::Other)
        .with_backend(BACKEND)
        .with_source(e)
}

/// Convert a `notify::EventKind` to a `StorageEventKind`.
///
/// Returns `None` for event kinds that are not relevant (e.g., Access).
fn storage_event_kind(kind: notify::EventKind) -> Option<StorageEventKind> {
    match kind {
        notify::EventKind::Create(_) => Some(StorageEventKind::Created),
        notify::EventKind::Modify(_) => Some(StorageEventKind::Modified),
        notify::EventKind::Remove(_) => Some(StorageEventKind::Removed),
        _ => None,
    }
}

/// Process a notify event result, recording matching events into the debouncer.
///
/// The `filter` closure maps a raw path to the path to record, or `None` to skip it.
fn record_notify_events(
    res: Result<notify::Event, notify::Error>,
    debouncer: &EventDebouncer,
    filter: impl Fn(PathBuf) -> Option<PathBuf>,
) {
    let event = match res {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "File watcher error");
            return;
        }
    };
    let Some(kind) = storage_event_kind(event.kind) else {
        return;
    };
    for path in event.paths {
        if let Some(path) = filter(path) {
            tracing::debug!(path = %path.display(), ?kind, "Recorded filesystem event");
            debouncer.record(path, kind);
        }
    }
}

/// Filesystem storage implementation.
///
/// Relative paths are resolved against the base directory; absolute paths are
/// used as given. `..` components are kept, so roots may sit beside the base
/// directory (e.g., `../shared`).
pub struct FsStorage {
    /// Directory relative paths are resolved against (usually the config dir).
    base_dir: PathBuf,
    /// Patterns for file watching, matched relative to each watched root.
    watch_patterns: Vec<Pattern>,
    /// Quiet period before a change event is delivered.
    debounce: Duration,
}

impl FsStorage {
    /// Create a new filesystem storage watching `**/*.md`.
    #[must_use]
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            watch_patterns: Pattern::new(DEFAULT_WATCH_PATTERN).into_iter().collect(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Create a new filesystem storage with custom watch patterns.
    ///
    /// An empty pattern list watches every file.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidPath` error if any pattern is not a valid glob.
    pub fn with_patterns(base_dir: PathBuf, patterns: &[String]) -> Result<Self, StorageError> {
        let watch_patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    StorageError::new(StorageErrorKind::InvalidPath)
                        .with_path(p)
                        .with_backend(BACKEND)
                        .with_source(e)
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            base_dir,
            watch_patterns,
            debounce: DEFAULT_DEBOUNCE,
        })
    }

    /// Set the debounce window for change events.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Resolve a storage path to a filesystem path.
    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Set up a recursive watcher for one root directory.
    ///
    /// Recorded paths are rewritten from `resolved_root` to `root` so events
    /// use the same path convention as the caller.
    fn watch_root(
        &self,
        root: &Path,
        resolved_root: PathBuf,
        debouncer: &Arc<EventDebouncer>,
    ) -> Result<notify::RecommendedWatcher, StorageError> {
        let debouncer = Arc::clone(debouncer);
        let patterns = self.watch_patterns.clone();
        let root = root.to_path_buf();
        let filter_root = resolved_root.clone();

        let mut watcher = notify::recommended_watcher(move |res| {
            record_notify_events(res, &debouncer, |path| {
                let rel_path = path.strip_prefix(&filter_root).ok()?;
                (patterns.is_empty() || patterns.iter().any(|p| p.matches_path(rel_path)))
                    .then(|| root.join(rel_path))
            });
        })
        .map_err(notify_error)?;

        watcher
            .watch(&resolved_root, RecursiveMode::Recursive)
            .map_err(notify_error)?;

        Ok(watcher)
    }
}

impl Storage for FsStorage {
    fn is_dir(&self, path: &Path) -> bool {
        self.resolve(path).is_dir()
    }

    fn list(&self, dir: &Path) -> Result<Vec<Entry>, StorageError> {
        let full_path = self.resolve(dir);
        let read_dir = fs::read_dir(&full_path)
            .map_err(|e| StorageError::io(e, Some(dir.to_path_buf())).with_backend(BACKEND))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry
                .map_err(|e| StorageError::io(e, Some(dir.to_path_buf())).with_backend(BACKEND))?;
            // Follow symlinks; entries that vanish mid-listing are skipped
            let Ok(metadata) = fs::metadata(entry.path()) else {
                continue;
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            if metadata.is_dir() {
                entries.push(Entry::directory(name));
            } else if metadata.is_file() {
                entries.push(Entry::file(name));
            }
        }
        Ok(entries)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        let full_path = self.resolve(path);
        fs::read_to_string(&full_path)
            .map_err(|e| StorageError::io(e, Some(path.to_path_buf())).with_backend(BACKEND))
    }

    fn watch(&self, roots: &[PathBuf]) -> Result<(StorageEventReceiver, WatchHandle), StorageError> {
        let (event_tx, event_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let debouncer = Arc::new(EventDebouncer::new(self.debounce));

        let mut watchers = Vec::with_capacity(roots.len());
        for root in roots {
            let resolved = self.resolve(root);
            if !resolved.is_dir() {
                tracing::warn!(path = %root.display(), "Sidebar root does not exist, not watching");
                continue;
            }
            // notify reports canonical paths, so filter against the canonical root
            let resolved = fs::canonicalize(&resolved).unwrap_or(resolved);
            watchers.push(self.watch_root(root, resolved, &debouncer)?);
        }

        tracing::info!(roots = watchers.len(), "Watching sidebar roots for changes");

        // Watchers are moved into the drain thread to keep them alive.
        std::thread::spawn(move || {
            let _watchers = watchers;

            loop {
                match shutdown_rx.recv_timeout(DRAIN_INTERVAL) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                }

                for event in debouncer.drain_ready() {
                    let event = StorageEvent {
                        path: event.path,
                        kind: event.kind,
                    };
                    if event_tx.send(event).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((
            StorageEventReceiver::new(event_rx),
            WatchHandle::new(shutdown_tx),
        ))
    }
}
