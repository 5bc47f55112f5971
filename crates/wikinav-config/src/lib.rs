//! Configuration management for wikinav.
//!
//! Parses `wikinav.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.hostname`
//! - `sidebar.dir`
//! - `sidebar.prefix`

mod expand;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wikinav_sidebar::{SidebarOptions, SidebarRequest, SortBy, normalize_prefix};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "wikinav.toml";

/// Default glob pattern for watched documents.
const DEFAULT_WATCH_PATTERN: &str = "**/*.md";

/// Default debounce window in milliseconds.
const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Build a single sidebar from this directory instead of the configured ones.
    pub dir: Option<PathBuf>,
    /// URL prefix for the `dir` sidebar. Defaults to `/`.
    pub prefix: Option<String>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site-wide data passed through to the renderer.
    pub site: SiteConfig,
    /// Sidebar sections as parsed from TOML.
    #[serde(rename = "sidebar")]
    sidebars: Vec<SidebarConfigRaw>,
    /// Change watching configuration.
    pub watch: WatchConfig,

    /// Resolved sidebar requests (set after loading).
    #[serde(skip)]
    pub sidebars_resolved: Vec<SidebarRequest>,
    /// Directory relative sidebar paths are resolved against (set after loading).
    #[serde(skip)]
    pub base_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site-wide configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,
    /// Public site URL used for sitemaps (e.g., `https://wiki.example.com`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Top navigation bar links.
    pub nav: Vec<NavLink>,
    /// Social links shown in the header.
    pub social: Vec<SocialLink>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Wiki".to_owned(),
            hostname: None,
            nav: Vec::new(),
            social: Vec::new(),
        }
    }
}

/// Top navigation bar link.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct NavLink {
    /// Link text.
    pub text: String,
    /// Link target.
    pub link: String,
}

/// Social link.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SocialLink {
    /// Icon name (e.g., "github").
    pub icon: String,
    /// Link target.
    pub link: String,
}

/// Raw sidebar configuration as parsed from TOML.
#[derive(Debug, Deserialize)]
struct SidebarConfigRaw {
    dir: String,
    #[serde(default)]
    prefix: String,
    title: Option<String>,
    include_index: Option<bool>,
    collapsed: Option<bool>,
    sort_by: Option<SortBy>,
    exclude: Option<Vec<String>>,
    recursive: Option<bool>,
}

/// Change watching configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// File patterns that trigger a rebuild, relative to each sidebar root.
    pub patterns: Vec<String>,
    /// Quiet period before a change triggers a rebuild.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            patterns: vec![DEFAULT_WATCH_PATTERN.to_owned()],
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.hostname`").
        field: String,
        /// Error message (e.g., "${`WIKI_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `wikinav.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// Relative sidebar directories are resolved against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion or validation fails.
    pub fn from_toml(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;

        // Expand environment variables before resolving sidebars
        config.expand_env_vars()?;
        config.validate()?;
        config.resolve(base_dir);

        Ok(config)
    }

    /// Sidebar requests to build, in configuration order.
    #[must_use]
    pub fn sidebar_requests(&self) -> &[SidebarRequest] {
        &self.sidebars_resolved
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(dir) = &settings.dir {
            let prefix = settings.prefix.as_deref().unwrap_or("/");
            self.sidebars_resolved = vec![SidebarRequest::new(dir.clone(), normalize_prefix(prefix))];
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            sidebars: Vec::new(),
            watch: WatchConfig::default(),
            sidebars_resolved: Vec::new(),
            base_dir: base.to_path_buf(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));

        let mut config = Self::from_toml(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_sidebars()?;
        self.validate_watch()?;
        Ok(())
    }

    /// Validate site configuration.
    fn validate_site(&self) -> Result<(), ConfigError> {
        if let Some(hostname) = &self.site.hostname {
            require_non_empty(hostname, "site.hostname")?;
            require_http_url(hostname, "site.hostname")?;
        }
        for (i, nav) in self.site.nav.iter().enumerate() {
            require_non_empty(&nav.text, &format!("site.nav[{i}].text"))?;
            require_non_empty(&nav.link, &format!("site.nav[{i}].link"))?;
        }
        for (i, social) in self.site.social.iter().enumerate() {
            require_non_empty(&social.icon, &format!("site.social[{i}].icon"))?;
            require_non_empty(&social.link, &format!("site.social[{i}].link"))?;
        }
        Ok(())
    }

    /// Validate sidebar configuration.
    fn validate_sidebars(&self) -> Result<(), ConfigError> {
        for (i, sidebar) in self.sidebars.iter().enumerate() {
            require_non_empty(&sidebar.dir, &format!("sidebar[{i}].dir"))?;
            require_non_empty(&sidebar.prefix, &format!("sidebar[{i}].prefix"))?;
        }
        Ok(())
    }

    /// Validate watch configuration.
    fn validate_watch(&self) -> Result<(), ConfigError> {
        if self.watch.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "watch.debounce_ms must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref hostname) = self.site.hostname {
            self.site.hostname = Some(expand::expand_env(hostname, "site.hostname")?);
        }

        for (i, sidebar) in self.sidebars.iter_mut().enumerate() {
            sidebar.dir = expand::expand_env(&sidebar.dir, &format!("sidebar[{i}].dir"))?;
            sidebar.prefix = expand::expand_env(&sidebar.prefix, &format!("sidebar[{i}].prefix"))?;
        }

        Ok(())
    }

    /// Turn raw sidebar entries into requests.
    ///
    /// Directories stay as written; the storage backend resolves them against
    /// `base_dir`.
    fn resolve(&mut self, base_dir: &Path) {
        self.base_dir = base_dir.to_path_buf();
        self.sidebars_resolved = self
            .sidebars
            .iter()
            .map(|raw| {
                let defaults = SidebarOptions::default();
                let options = SidebarOptions {
                    include_index: raw.include_index.unwrap_or(defaults.include_index),
                    collapsed: raw.collapsed.unwrap_or(defaults.collapsed),
                    sort_by: raw.sort_by.unwrap_or(defaults.sort_by),
                    exclude: raw.exclude.as_ref().map_or(defaults.exclude, |names| {
                        names.iter().cloned().collect::<BTreeSet<_>>()
                    }),
                    recursive: raw.recursive.unwrap_or(defaults.recursive),
                };
                SidebarRequest {
                    dir: PathBuf::from(&raw.dir),
                    prefix: normalize_prefix(&raw.prefix),
                    title: raw.title.clone(),
                    options,
                }
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(toml: &str) -> Result<Config, ConfigError> {
        Config::from_toml(toml, Path::new("/project"))
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));

        assert_eq!(config.site.title, "Wiki");
        assert!(config.site.hostname.is_none());
        assert!(config.sidebar_requests().is_empty());
        assert_eq!(config.watch.patterns, vec!["**/*.md".to_owned()]);
        assert_eq!(config.watch.debounce_ms, 100);
        assert_eq!(config.base_dir, PathBuf::from("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse("").unwrap();

        assert_eq!(config.site.title, "Wiki");
        assert!(config.sidebar_requests().is_empty());
        assert_eq!(config.base_dir, PathBuf::from("/project"));
    }

    #[test]
    fn test_parse_site_config() {
        let config = parse(
            r#"
[site]
title = "Team Wiki"
hostname = "https://wiki.example.com"

[[site.nav]]
text = "Guide"
link = "/guide/"

[[site.social]]
icon = "github"
link = "https://github.com/example/wiki"
"#,
        )
        .unwrap();

        assert_eq!(config.site.title, "Team Wiki");
        assert_eq!(
            config.site.hostname.as_deref(),
            Some("https://wiki.example.com")
        );
        assert_eq!(
            config.site.nav,
            vec![NavLink {
                text: "Guide".to_owned(),
                link: "/guide/".to_owned(),
            }]
        );
        assert_eq!(config.site.social[0].icon, "github");
    }

    #[test]
    fn test_parse_sidebars() {
        let config = parse(
            r#"
[[sidebar]]
dir = "docs/guide"
prefix = "guide"
title = "Guide"
sort_by = "title"
exclude = ["draft.md"]

[[sidebar]]
dir = "docs/blog"
prefix = "/blog/"
include_index = false
collapsed = true
sort_by = "date"
recursive = false
"#,
        )
        .unwrap();

        let requests = config.sidebar_requests();
        assert_eq!(requests.len(), 2);

        let guide = &requests[0];
        assert_eq!(guide.dir, PathBuf::from("docs/guide"));
        assert_eq!(guide.prefix, "/guide/");
        assert_eq!(guide.title.as_deref(), Some("Guide"));
        assert_eq!(guide.options.sort_by, SortBy::Title);
        assert!(guide.options.include_index);
        assert!(guide.options.recursive);
        assert!(guide.options.is_excluded("draft.md"));
        assert!(!guide.options.is_excluded("README.md"));

        let blog = &requests[1];
        assert_eq!(blog.title, None);
        assert_eq!(
            blog.options,
            SidebarOptions {
                include_index: false,
                collapsed: true,
                sort_by: SortBy::Date,
                exclude: SidebarOptions::default().exclude,
                recursive: false,
            }
        );
    }

    #[test]
    fn test_exclude_defaults_to_readme_unless_set() {
        let config = parse(
            r#"
[[sidebar]]
dir = "docs"
prefix = "/"

[[sidebar]]
dir = "notes"
prefix = "/notes/"
exclude = []
"#,
        )
        .unwrap();

        let requests = config.sidebar_requests();
        assert!(requests[0].options.is_excluded("README.md"));
        assert!(requests[1].options.exclude.is_empty());
    }

    #[test]
    fn test_parse_unknown_sort_is_error() {
        let result = parse(
            r#"
[[sidebar]]
dir = "docs"
prefix = "/"
sort_by = "size"
"#,
        );

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_parse_watch_config() {
        let config = parse(
            r#"
[watch]
patterns = ["**/*.md", "**/*.markdown"]
debounce_ms = 250
"#,
        )
        .unwrap();

        assert_eq!(
            config.watch.patterns,
            vec!["**/*.md".to_owned(), "**/*.markdown".to_owned()]
        );
        assert_eq!(config.watch.debounce_ms, 250);
    }

    #[test]
    fn test_validate_empty_prefix() {
        let err = parse(
            r#"
[[sidebar]]
dir = "docs"
"#,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: sidebar[0].prefix cannot be empty"
        );
    }

    #[test]
    fn test_validate_hostname_scheme() {
        let err = parse(
            r#"
[site]
hostname = "wiki.example.com"
"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("site.hostname must start with http"));
    }

    #[test]
    fn test_validate_nav_link_empty() {
        let err = parse(
            r#"
[[site.nav]]
text = "Guide"
link = ""
"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("site.nav[0].link cannot be empty"));
    }

    #[test]
    fn test_validate_debounce_zero() {
        let err = parse(
            r"
[watch]
debounce_ms = 0
",
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_expand_env_vars_in_prefix_and_hostname() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("WIKINAV_CONFIG_TEST_HOST", "docs.example.com");
            std::env::remove_var("WIKINAV_CONFIG_TEST_SECTION");
        }

        let config = parse(
            r#"
[site]
hostname = "https://${WIKINAV_CONFIG_TEST_HOST}"

[[sidebar]]
dir = "docs"
prefix = "${WIKINAV_CONFIG_TEST_SECTION:-handbook}"
"#,
        )
        .unwrap();

        assert_eq!(
            config.site.hostname.as_deref(),
            Some("https://docs.example.com")
        );
        assert_eq!(config.sidebar_requests()[0].prefix, "/handbook/");

        unsafe {
            std::env::remove_var("WIKINAV_CONFIG_TEST_HOST");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::remove_var("WIKINAV_CONFIG_TEST_MISSING");
        }

        let err = parse(
            r#"
[[sidebar]]
dir = "${WIKINAV_CONFIG_TEST_MISSING}"
prefix = "/"
"#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "sidebar[0].dir"));
    }

    #[test]
    fn test_apply_cli_settings_dir_replaces_sidebars() {
        let mut config = parse(
            r#"
[[sidebar]]
dir = "docs/guide"
prefix = "/guide/"
"#,
        )
        .unwrap();

        config.apply_cli_settings(&CliSettings {
            dir: Some(PathBuf::from("/tmp/notes")),
            prefix: Some("notes".to_owned()),
        });

        assert_eq!(
            config.sidebar_requests(),
            &[SidebarRequest::new("/tmp/notes", "/notes/")]
        );
    }

    #[test]
    fn test_apply_cli_settings_dir_defaults_to_root_prefix() {
        let mut config = Config::default_with_base(Path::new("/project"));

        config.apply_cli_settings(&CliSettings {
            dir: Some(PathBuf::from("/tmp/notes")),
            prefix: None,
        });

        assert_eq!(config.sidebar_requests()[0].prefix, "/");
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = parse(
            r#"
[[sidebar]]
dir = "docs"
prefix = "/"
"#,
        )
        .unwrap();

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.sidebar_requests().len(), 1);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/wikinav.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_uses_config_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("wikinav.toml");
        std::fs::write(
            &path,
            r#"
[[sidebar]]
dir = "docs"
prefix = "/docs/"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.base_dir, temp_dir.path());
        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.sidebar_requests()[0].dir, PathBuf::from("docs"));
    }

    #[test]
    fn test_site_serializes_for_output() {
        let config = parse(
            r#"
[site]
title = "Team Wiki"

[[site.nav]]
text = "Blog"
link = "/blog/"
"#,
        )
        .unwrap();

        let json = serde_json::to_value(&config.site).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "title": "Team Wiki",
                "nav": [{ "text": "Blog", "link": "/blog/" }],
                "social": []
            })
        );
    }
}
