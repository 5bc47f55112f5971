//! Storage abstraction for the wikinav sidebar generator.
//!
//! The sidebar builder never touches the filesystem directly. It lists
//! directories, reads documents and subscribes to changes through the
//! [`Storage`] trait, which keeps the traversal logic testable against an
//! in-memory tree.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `is_dir()`, `list()`, `read()` and `watch()` methods
//! - [`StorageError`] with semantic [`StorageErrorKind`] categories
//! - [`StorageEvent`], [`StorageEventReceiver`] and [`WatchHandle`] for change notification
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! The filesystem backend lives in the `wikinav-storage-fs` crate.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use wikinav_storage::Storage;
//!
//! for entry in storage.list(Path::new("docs/guide"))? {
//!     println!("{} ({:?})", entry.name, entry.kind);
//! }
//! ```

mod event;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use event::{StorageEvent, StorageEventKind, StorageEventReceiver, WatchHandle};
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Entry, EntryKind, Storage, StorageError, StorageErrorKind};
