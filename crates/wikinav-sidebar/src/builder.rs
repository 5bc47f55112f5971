//! Sidebar tree construction.
//!
//! [`SidebarBuilder`] walks a directory depth-first through the
//! [`Storage`] trait and turns it into [`SidebarItem`]s:
//!
//! 1. List the directory; skip hidden entries
//! 2. Keep `.md` files that aren't excluded, reading title/date from frontmatter
//! 3. Sort the documents, pulling the index document to the front if requested
//! 4. Recurse into subdirectories, dropping the ones that produce nothing
//!
//! Every build starts from scratch; nothing is cached between calls.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use wikinav_storage::{Entry, Storage, StorageErrorKind};

use crate::frontmatter::{extract_frontmatter, parse_date, parse_frontmatter};
use crate::model::{Document, Forest, Section, SidebarItem};
use crate::options::{SidebarOptions, SidebarRequest, SortBy, normalize_prefix};
use crate::warning::{BuildWarning, Reporter, TracingReporter};

/// File name of a directory's landing document.
const INDEX_FILE: &str = "index.md";

/// Extension of documents.
const DOCUMENT_EXTENSION: &str = ".md";

/// Builds sidebar trees from a [`Storage`] backend.
#[derive(Clone)]
pub struct SidebarBuilder {
    storage: Arc<dyn Storage>,
    reporter: Arc<dyn Reporter>,
}

/// Result of building one directory.
struct DirectoryListing {
    items: Vec<SidebarItem>,
    /// Frontmatter title of the directory's `index.md`, if any.
    index_title: Option<String>,
}

impl SidebarBuilder {
    /// Create a builder that reports warnings through `tracing`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Replace the warning reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Storage backend the builder reads from.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Build the entries of one directory.
    ///
    /// Returns `[index document] + sorted documents + non-empty subsections`.
    /// A missing or unreadable directory is reported and yields no entries.
    ///
    /// # Arguments
    ///
    /// * `directory` - Directory to read
    /// * `url_prefix` - URL prefix the directory is published under
    /// * `options` - Generation options
    pub fn build_section(
        &self,
        directory: &Path,
        url_prefix: &str,
        options: &SidebarOptions,
    ) -> Vec<SidebarItem> {
        let entries = match self.storage.list(directory) {
            Ok(entries) => entries,
            Err(e) if e.kind == StorageErrorKind::NotFound => {
                self.reporter.warn(BuildWarning::MissingDirectory {
                    path: directory.to_path_buf(),
                });
                return Vec::new();
            }
            Err(e) => {
                self.reporter.warn(BuildWarning::ReadFailed {
                    path: directory.to_path_buf(),
                    message: e.to_string(),
                });
                return Vec::new();
            }
        };

        let link_base = normalize_prefix(url_prefix);
        self.build_directory(directory, entries, &link_base, options).items
    }

    /// Build one navigation tree per request, keyed by normalised prefix.
    ///
    /// Each non-empty request becomes a top-level [`Section`] linked to its
    /// prefix. Entries linking to the prefix itself are dropped from its
    /// children, and requests that end up empty contribute nothing.
    pub fn build_forest(&self, requests: &[SidebarRequest]) -> Forest {
        let start = Instant::now();
        let mut forest = Forest::new();

        for request in requests {
            let prefix = normalize_prefix(&request.prefix);
            let items: Vec<SidebarItem> = self
                .build_section(&request.dir, &prefix, &request.options)
                .into_iter()
                .filter(|item| item.link() != Some(prefix.as_str()))
                .collect();

            if items.is_empty() {
                tracing::debug!(
                    dir = %request.dir.display(),
                    prefix = %prefix,
                    "Sidebar request produced no entries"
                );
                continue;
            }

            let title = request
                .title
                .clone()
                .unwrap_or_else(|| title_from_prefix(&prefix));
            let section = Section {
                title,
                link: Some(prefix.clone()),
                collapsed: None,
                items,
            };
            forest.entry(prefix).or_default().sections.push(section);
        }

        tracing::info!(
            requests = requests.len(),
            trees = forest.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Sidebar built"
        );

        forest
    }

    /// Build a directory from its listed entries.
    fn build_directory(
        &self,
        dir: &Path,
        entries: Vec<Entry>,
        link_base: &str,
        options: &SidebarOptions,
    ) -> DirectoryListing {
        let (mut subdirs, files): (Vec<Entry>, Vec<Entry>) = entries
            .into_iter()
            .filter(|entry| !entry.name.starts_with('.'))
            .partition(Entry::is_dir);

        let mut index = None;
        let mut index_title = None;
        let mut documents = Vec::new();
        for file in files {
            if !is_document(&file.name) || options.is_excluded(&file.name) {
                continue;
            }
            let (document, meta_title) = self.load_document(dir, link_base, &file.name);
            if document.is_index {
                index_title = meta_title;
            }
            if document.is_index && options.include_index {
                index = Some(document);
            } else {
                documents.push(document);
            }
        }

        sort_documents(&mut documents, options.sort_by);

        let mut items = Vec::with_capacity(documents.len() + subdirs.len() + 1);
        items.extend(index.map(SidebarItem::Document));
        items.extend(documents.into_iter().map(SidebarItem::Document));

        if options.recursive {
            subdirs.sort_by(|a, b| a.name.cmp(&b.name));
            for subdir in subdirs {
                let path = dir.join(&subdir.name);
                let entries = match self.storage.list(&path) {
                    Ok(entries) => entries,
                    Err(e) => {
                        self.reporter.warn(BuildWarning::ReadFailed {
                            path,
                            message: e.to_string(),
                        });
                        continue;
                    }
                };
                let child_base = format!("{link_base}{}/", subdir.name);
                let listing = self.build_directory(&path, entries, &child_base, options);
                if listing.items.is_empty() {
                    continue;
                }
                items.push(SidebarItem::Section(Section {
                    title: listing.index_title.unwrap_or(subdir.name),
                    link: None,
                    collapsed: Some(options.collapsed),
                    items: listing.items,
                }));
            }
        }

        DirectoryListing { items, index_title }
    }

    /// Read one document and derive its entry.
    ///
    /// Returns the document and the title found in its frontmatter, if any.
    /// Read and parse failures are reported and fall back to file name defaults.
    fn load_document(
        &self,
        dir: &Path,
        link_base: &str,
        file_name: &str,
    ) -> (Document, Option<String>) {
        let path = dir.join(file_name);
        let stem = file_name
            .strip_suffix(DOCUMENT_EXTENSION)
            .unwrap_or(file_name);
        let is_index = file_name == INDEX_FILE;
        let link = if is_index {
            link_base.to_owned()
        } else {
            format!("{link_base}{stem}")
        };

        let (meta_title, date) = self.read_metadata(&path);

        let document = Document {
            title: meta_title.clone().unwrap_or_else(|| stem.to_owned()),
            link,
            file_name: file_name.to_owned(),
            date,
            is_index,
        };
        (document, meta_title)
    }

    /// Read title and date from a document's frontmatter.
    fn read_metadata(&self, path: &Path) -> (Option<String>, Option<chrono::NaiveDateTime>) {
        let content = match self.storage.read(path) {
            Ok(content) => content,
            Err(e) => {
                self.reporter.warn(BuildWarning::ReadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
                return (None, None);
            }
        };

        let frontmatter = match extract_frontmatter(&content).and_then(|block| {
            block.map(parse_frontmatter).transpose()
        }) {
            Ok(Some(frontmatter)) => frontmatter,
            Ok(None) => return (None, None),
            Err(e) => {
                self.reporter.warn(BuildWarning::InvalidFrontmatter {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
                return (None, None);
            }
        };

        let date = frontmatter.date.and_then(|value| {
            let parsed = parse_date(&value);
            if parsed.is_none() {
                self.reporter.warn(BuildWarning::InvalidDate {
                    path: path.to_path_buf(),
                    value,
                });
            }
            parsed
        });

        (frontmatter.title, date)
    }

    /// Root directories of the given requests, without duplicates.
    pub(crate) fn roots(requests: &[SidebarRequest]) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::with_capacity(requests.len());
        for request in requests {
            if !roots.contains(&request.dir) {
                roots.push(request.dir.clone());
            }
        }
        roots
    }
}

/// True if the file name has the document extension.
fn is_document(file_name: &str) -> bool {
    file_name.len() > DOCUMENT_EXTENSION.len() && file_name.ends_with(DOCUMENT_EXTENSION)
}

/// Order sibling documents by the configured strategy.
///
/// Ties always fall back to file name so the order never depends on listing order.
fn sort_documents(documents: &mut [Document], sort_by: SortBy) {
    let by_name = |a: &Document, b: &Document| a.file_name.cmp(&b.file_name);
    let by_title = |a: &Document, b: &Document| a.title.cmp(&b.title).then_with(|| by_name(a, b));

    match sort_by {
        SortBy::Name => documents.sort_by(by_name),
        SortBy::Title => documents.sort_by(by_title),
        SortBy::Date => documents.sort_by(|a, b| match (a.date, b.date) {
            (Some(x), Some(y)) => y.cmp(&x).then_with(|| by_title(a, b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => by_title(a, b),
        }),
    }
}

/// Derive a section title from a normalised prefix.
///
/// The prefix without its slashes, first character uppercased
/// (`/user-guide/` → "User-guide"), or "Home" for the root prefix.
fn title_from_prefix(prefix: &str) -> String {
    let mut chars = prefix.trim_matches('/').chars();
    match chars.next() {
        None => "Home".to_owned(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}
