//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod watch;

pub(crate) use build::BuildArgs;
pub(crate) use watch::WatchArgs;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use serde::Serialize;
use wikinav_config::{CliSettings, Config, SiteConfig};
use wikinav_sidebar::{Forest, SidebarBuilder};
use wikinav_storage_fs::FsStorage;

use crate::error::CliError;
use crate::output::ConsoleReporter;

/// Arguments shared by `build` and `watch`.
#[derive(Args)]
pub(crate) struct SourceArgs {
    /// Path to configuration file (default: auto-discover wikinav.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Build a single sidebar from this directory (overrides config).
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// URL prefix for --dir (default: /).
    #[arg(short, long, requires = "dir")]
    prefix: Option<String>,

    /// Write JSON to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON.
    #[arg(long)]
    pretty: bool,
}

impl SourceArgs {
    /// Load configuration and create a builder over the filesystem.
    fn load(&self) -> Result<(Config, SidebarBuilder), CliError> {
        let cli_settings = CliSettings {
            dir: self.dir.as_deref().map(std::path::absolute).transpose()?,
            prefix: self.prefix.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let storage = FsStorage::with_patterns(config.base_dir.clone(), &config.watch.patterns)?
            .with_debounce(Duration::from_millis(config.watch.debounce_ms));
        let builder = SidebarBuilder::new(Arc::new(storage))
            .with_reporter(Arc::new(ConsoleReporter::new()));

        Ok((config, builder))
    }

    /// Write the sidebar document to the configured destination.
    fn write(&self, site: &SiteConfig, sidebar: &Forest) -> Result<(), CliError> {
        write_document(
            &SidebarDocument { site, sidebar },
            self.output.as_deref(),
            self.pretty,
        )
    }
}

/// JSON document handed to the site renderer.
#[derive(Serialize)]
struct SidebarDocument<'a> {
    site: &'a SiteConfig,
    sidebar: &'a Forest,
}

/// Serialize `document` to `path`, or stdout when no path is given.
fn write_document(
    document: &SidebarDocument<'_>,
    path: Option<&Path>,
    pretty: bool,
) -> Result<(), CliError> {
    let mut json = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    json.push('\n');

    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wikinav_sidebar::{NavigationTree, Section};

    use super::*;

    fn forest() -> Forest {
        let mut forest = Forest::new();
        forest.insert(
            "/guide/".to_owned(),
            NavigationTree {
                sections: vec![Section {
                    title: "Guide".to_owned(),
                    link: Some("/guide/".to_owned()),
                    collapsed: None,
                    items: Vec::new(),
                }],
            },
        );
        forest
    }

    #[test]
    fn test_write_document_to_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out/sidebar.json");
        let site = SiteConfig::default();
        let sidebar = forest();

        write_document(
            &SidebarDocument {
                site: &site,
                sidebar: &sidebar,
            },
            Some(&path),
            false,
        )
        .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            written,
            serde_json::json!({
                "site": { "title": "Wiki", "nav": [], "social": [] },
                "sidebar": {
                    "/guide/": [{
                        "text": "Guide",
                        "link": "/guide/",
                        "items": []
                    }]
                }
            })
        );
    }

    #[test]
    fn test_write_document_pretty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sidebar.json");
        let site = SiteConfig::default();
        let sidebar = Forest::new();

        write_document(
            &SidebarDocument {
                site: &site,
                sidebar: &sidebar,
            },
            Some(&path),
            true,
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("{\n  \"site\""));
        assert!(content.ends_with("}\n"));
    }
}
