//! Build warnings and the reporter they are delivered through.
//!
//! Nothing in a sidebar build is fatal. Problems are reported here and the
//! build continues with fallbacks.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A non-fatal problem encountered while building a sidebar.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildWarning {
    /// The configured root directory does not exist.
    #[error("Sidebar directory does not exist: {}", path.display())]
    MissingDirectory {
        /// Directory that was requested.
        path: PathBuf,
    },
    /// A directory or document could not be read.
    #[error("Failed to read {}: {message}", path.display())]
    ReadFailed {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },
    /// The frontmatter block is malformed; file name defaults are used.
    #[error("Invalid frontmatter in {}: {message}", path.display())]
    InvalidFrontmatter {
        /// Document path.
        path: PathBuf,
        /// Parse error.
        message: String,
    },
    /// The frontmatter date can't be parsed; the document is treated as undated.
    #[error("Unparseable date {value:?} in {}", path.display())]
    InvalidDate {
        /// Document path.
        path: PathBuf,
        /// Raw date value.
        value: String,
    },
}

impl BuildWarning {
    /// Path the warning refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::MissingDirectory { path }
            | Self::ReadFailed { path, .. }
            | Self::InvalidFrontmatter { path, .. }
            | Self::InvalidDate { path, .. } => path,
        }
    }
}

/// Receives build warnings.
pub trait Reporter: Send + Sync {
    /// Report a warning.
    fn warn(&self, warning: BuildWarning);
}

/// Reporter that logs warnings through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn warn(&self, warning: BuildWarning) {
        tracing::warn!(path = %warning.path().display(), "{warning}");
    }
}

/// Reporter that keeps warnings in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    warnings: Mutex<Vec<BuildWarning>>,
}

impl CollectingReporter {
    /// Create an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the warnings reported so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn warnings(&self) -> Vec<BuildWarning> {
        self.warnings.lock().unwrap().clone()
    }

    /// Remove and return the warnings reported so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn take(&self) -> Vec<BuildWarning> {
        std::mem::take(&mut *self.warnings.lock().unwrap())
    }
}

impl Reporter for CollectingReporter {
    fn warn(&self, warning: BuildWarning) {
        self.warnings.lock().unwrap().push(warning);
    }
}
