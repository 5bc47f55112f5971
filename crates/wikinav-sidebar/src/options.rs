//! Sidebar generation options and requests.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Deserialize;

/// File left out of every sidebar unless the exclusion set is overridden.
pub const DEFAULT_EXCLUDE: &str = "README.md";

/// Ordering applied to the documents of one directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Lexicographic by file name.
    #[default]
    Name,
    /// Most recent frontmatter date first; undated documents last, by title.
    Date,
    /// Lexicographic by title.
    Title,
}

/// Per-request generation options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidebarOptions {
    /// List each directory's `index.md` first.
    pub include_index: bool,
    /// Initial collapse state of generated sections.
    pub collapsed: bool,
    /// Document ordering within a directory.
    pub sort_by: SortBy,
    /// File names to leave out (e.g., "draft.md"). Defaults to [`DEFAULT_EXCLUDE`].
    pub exclude: BTreeSet<String>,
    /// Descend into subdirectories.
    pub recursive: bool,
}

impl Default for SidebarOptions {
    fn default() -> Self {
        Self {
            include_index: true,
            collapsed: false,
            sort_by: SortBy::default(),
            exclude: BTreeSet::from([DEFAULT_EXCLUDE.to_owned()]),
            recursive: true,
        }
    }
}

impl SidebarOptions {
    /// True if `file_name` is in the exclusion set.
    #[must_use]
    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.exclude.contains(file_name)
    }
}

/// One sidebar to generate: a root directory published under a URL prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidebarRequest {
    /// Root directory of the documents.
    pub dir: PathBuf,
    /// URL prefix the documents are served under (e.g., "/guide/").
    pub prefix: String,
    /// Top-level section title. Derived from the prefix when unset.
    pub title: Option<String>,
    /// Generation options.
    pub options: SidebarOptions,
}

impl SidebarRequest {
    /// Create a request with default options.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            title: None,
            options: SidebarOptions::default(),
        }
    }

    /// Set the top-level section title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the generation options.
    #[must_use]
    pub fn with_options(mut self, options: SidebarOptions) -> Self {
        self.options = options;
        self
    }
}

/// Normalise a URL prefix to the `/segment/.../` form.
///
/// - `""` and `"/"` → `"/"`
/// - `"guide"` → `"/guide/"`
/// - `"/api//v1"` → `"/api/v1/"`
#[must_use]
pub fn normalize_prefix(prefix: &str) -> String {
    let segments: Vec<&str> = prefix
        .trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.is_empty() {
        "/".to_owned()
    } else {
        format!("/{}/", segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix(""), "/");
        assert_eq!(normalize_prefix("/"), "/");
        assert_eq!(normalize_prefix("guide"), "/guide/");
        assert_eq!(normalize_prefix("/guide"), "/guide/");
        assert_eq!(normalize_prefix("/guide/"), "/guide/");
        assert_eq!(normalize_prefix(" /api//v1 "), "/api/v1/");
    }

    #[test]
    fn test_sort_by_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            sort_by: SortBy,
        }

        let parsed: Wrapper = serde_yaml::from_str("sort_by: date").unwrap();
        assert_eq!(parsed.sort_by, SortBy::Date);
        assert!(serde_yaml::from_str::<Wrapper>("sort_by: size").is_err());
    }

    #[test]
    fn test_default_options() {
        let options = SidebarOptions::default();

        assert!(options.include_index);
        assert!(!options.collapsed);
        assert_eq!(options.sort_by, SortBy::Name);
        assert!(options.recursive);
        assert!(options.is_excluded("README.md"));
        assert!(!options.is_excluded("readme.md"));
    }

    #[test]
    fn test_request_builder() {
        let mut exclude = BTreeSet::new();
        exclude.insert("draft.md".to_owned());
        let options = SidebarOptions {
            sort_by: SortBy::Title,
            exclude,
            ..SidebarOptions::default()
        };

        let request = SidebarRequest::new("docs/guide", "/guide/")
            .with_title("Guide")
            .with_options(options);

        assert_eq!(request.title.as_deref(), Some("Guide"));
        assert_eq!(request.options.sort_by, SortBy::Title);
        assert!(request.options.is_excluded("draft.md"));
        assert!(!request.options.is_excluded("setup.md"));
        assert!(request.options.recursive);
    }
}
