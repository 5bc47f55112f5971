//! Event debouncing for change notification.
//!
//! Coalesces bursts of filesystem events into one event per path, so an
//! editor emitting several writes per save triggers a single rebuild.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use wikinav_storage::StorageEventKind;

/// A debounced event ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DebouncedEvent {
    /// File system path.
    pub path: PathBuf,
    /// Kind of change.
    pub kind: StorageEventKind,
}

/// Pending event waiting to be emitted.
struct PendingEvent {
    kind: StorageEventKind,
    deadline: Instant,
}

/// Thread-safe event debouncer.
///
/// Each recorded event pushes the path's deadline forward; the path is
/// released by [`drain_ready`](Self::drain_ready) once quiet for the
/// debounce duration.
pub(crate) struct EventDebouncer {
    pending: Mutex<HashMap<PathBuf, PendingEvent>>,
    debounce_duration: Duration,
}

impl EventDebouncer {
    /// Create a new debouncer with the specified debounce duration.
    pub fn new(debounce_duration: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            debounce_duration,
        }
    }

    /// Record an event. Called from watcher callbacks.
    pub fn record(&self, path: PathBuf, kind: StorageEventKind) {
        let mut pending = self.pending.lock().unwrap();
        let deadline = Instant::now() + self.debounce_duration;

        match pending.entry(path) {
            Entry::Vacant(entry) => {
                entry.insert(PendingEvent { kind, deadline });
            }
            Entry::Occupied(mut entry) => {
                if let Some(coalesced) = Self::coalesce(entry.get().kind, kind) {
                    let event = entry.get_mut();
                    event.kind = coalesced;
                    event.deadline = deadline;
                } else {
                    // Created then removed: nothing happened as far as we care
                    entry.remove();
                }
            }
        }
    }

    /// Coalesce two event kinds.
    ///
    /// Returns `None` if both events should be discarded (Created + Removed).
    #[allow(clippy::match_same_arms)]
    fn coalesce(existing: StorageEventKind, new: StorageEventKind) -> Option<StorageEventKind> {
        use StorageEventKind::{Created, Modified, Removed};

        match (existing, new) {
            (Created, Created) => Some(Created),
            (Created, Modified) => Some(Created),
            (Created, Removed) => None,

            (Modified, Created) => Some(Created),
            (Modified, Modified) => Some(Modified),
            (Modified, Removed) => Some(Removed),

            // Replaced in place (write temp + rename)
            (Removed, Created) => Some(Modified),
            (Removed, Modified) => Some(Removed),
            (Removed, Removed) => Some(Removed),
        }
    }

    /// Drain events that have passed their debounce deadline.
    pub fn drain_ready(&self) -> Vec<DebouncedEvent> {
        let mut pending = self.pending.lock().unwrap();
        let now = Instant::now();

        let ready_paths: Vec<PathBuf> = pending
            .iter()
            .filter(|(_, event)| event.deadline <= now)
            .map(|(path, _)| path.clone())
            .collect();

        ready_paths
            .into_iter()
            .filter_map(|path| {
                pending
                    .remove(&path)
                    .map(|event| DebouncedEvent { path, kind: event.kind })
            })
            .collect()
    }
}
