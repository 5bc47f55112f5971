//! Sidebar navigation generation for wikinav.
//!
//! Turns directories of Markdown documents into navigation trees for a site
//! renderer. Titles and dates come from each document's YAML frontmatter;
//! links are derived from paths relative to a URL prefix.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use wikinav_sidebar::{SidebarBuilder, SidebarRequest};
//! use wikinav_storage_fs::FsStorage;
//!
//! let builder = SidebarBuilder::new(Arc::new(FsStorage::new(".".into())));
//! let forest = builder.build_forest(&[SidebarRequest::new("docs/guide", "/guide/")]);
//! ```
//!
//! Problems encountered during a build (missing directories, unreadable
//! files, bad frontmatter) never abort it. They are delivered to a
//! [`Reporter`] and the build falls back to file name defaults.

mod builder;
mod frontmatter;
mod model;
mod options;
mod warning;
mod watch;

pub use builder::SidebarBuilder;
pub use model::{Document, Forest, NavigationTree, Section, SidebarItem};
pub use options::{DEFAULT_EXCLUDE, SidebarOptions, SidebarRequest, SortBy, normalize_prefix};
pub use warning::{BuildWarning, CollectingReporter, Reporter, TracingReporter};
pub use watch::ForestWatcher;
