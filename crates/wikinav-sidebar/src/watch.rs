//! Live sidebar updates.
//!
//! [`ForestWatcher`] subscribes to changes under every request root and
//! rebuilds the whole forest when a document changes. Events that arrive
//! together are folded into a single rebuild.

use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::Instant;

use wikinav_storage::{StorageError, StorageEvent, StorageEventReceiver, WatchHandle};

use crate::builder::SidebarBuilder;
use crate::model::Forest;
use crate::options::SidebarRequest;

/// Rebuilds a forest whenever documents under its roots change.
pub struct ForestWatcher {
    builder: SidebarBuilder,
    requests: Vec<SidebarRequest>,
    roots: Vec<PathBuf>,
    receiver: StorageEventReceiver,
    _handle: WatchHandle,
}

impl ForestWatcher {
    /// Subscribe to changes under the roots of `requests`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend can't start watching.
    pub fn start(
        builder: SidebarBuilder,
        requests: Vec<SidebarRequest>,
    ) -> Result<Self, StorageError> {
        let roots = SidebarBuilder::roots(&requests);
        let (receiver, handle) = builder.storage().watch(&roots)?;

        tracing::info!(roots = roots.len(), "Watching sidebar directories");

        Ok(Self {
            builder,
            requests,
            roots,
            receiver,
            _handle: handle,
        })
    }

    /// Build the forest once, without waiting for changes.
    #[must_use]
    pub fn build(&self) -> Forest {
        self.builder.build_forest(&self.requests)
    }

    /// Block on change events, calling `on_change` with each rebuilt forest.
    ///
    /// Returns when `on_change` breaks or the event stream ends, with the
    /// number of rebuilds performed.
    pub fn run<F>(self, mut on_change: F) -> usize
    where
        F: FnMut(&Forest) -> ControlFlow<()>,
    {
        let mut rebuilds = 0;

        while let Some(event) = self.receiver.recv() {
            let mut relevant = self.is_relevant(&event);
            while let Some(queued) = self.receiver.try_recv() {
                relevant |= self.is_relevant(&queued);
            }
            if !relevant {
                continue;
            }

            let start = Instant::now();
            let forest = self.build();
            rebuilds += 1;
            tracing::info!(
                path = %event.path.display(),
                kind = ?event.kind,
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Sidebar rebuilt"
            );

            if on_change(&forest).is_break() {
                break;
            }
        }

        rebuilds
    }

    fn is_relevant(&self, event: &StorageEvent) -> bool {
        let relevant = self.roots.iter().any(|root| event.is_under(root));
        if !relevant {
            tracing::debug!(path = %event.path.display(), "Ignoring change outside sidebar roots");
        }
        relevant
    }
}
