//! Change notification returned by [`Storage::watch`](crate::Storage::watch).

use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// What happened to a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageEventKind {
    Created,
    Modified,
    Removed,
}

/// One change to a document under a watched root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageEvent {
    /// Document path in the same convention as the watched roots
    /// (e.g., "docs/guide/setup.md" for root "docs/guide").
    pub path: PathBuf,
    pub kind: StorageEventKind,
}

impl StorageEvent {
    /// True if the changed document lives under `root`.
    #[must_use]
    pub fn is_under(&self, root: &Path) -> bool {
        self.path.starts_with(root)
    }
}

/// Blocking stream of [`StorageEvent`]s.
///
/// The stream ends once the backend drops its sender.
pub struct StorageEventReceiver {
    rx: mpsc::Receiver<StorageEvent>,
}

impl StorageEventReceiver {
    #[must_use]
    pub fn new(rx: mpsc::Receiver<StorageEvent>) -> Self {
        Self { rx }
    }

    /// Block until the next event. `None` once the stream has ended.
    #[must_use]
    pub fn recv(&self) -> Option<StorageEvent> {
        self.rx.recv().ok()
    }

    /// Next already-queued event, if any.
    #[must_use]
    pub fn try_recv(&self) -> Option<StorageEvent> {
        self.rx.try_recv().ok()
    }

    /// A stream that has already ended.
    pub(crate) fn no_op() -> Self {
        let (_, rx) = mpsc::channel();
        Self { rx }
    }
}

/// Keeps a watch alive; dropping it tells the backend to stop.
pub struct WatchHandle {
    _shutdown: Option<mpsc::Sender<()>>,
}

impl WatchHandle {
    /// Wrap the sender whose disconnect the backend treats as shutdown.
    #[must_use]
    pub fn new(shutdown: mpsc::Sender<()>) -> Self {
        Self {
            _shutdown: Some(shutdown),
        }
    }

    /// Handle for a watch with nothing to stop.
    #[must_use]
    pub fn no_op() -> Self {
        Self { _shutdown: None }
    }

    /// Stop watching now rather than at drop.
    pub fn stop(self) {}
}
