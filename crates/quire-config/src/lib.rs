//! Configuration management for Quire.
//!
//! Parses `quire.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! The loaded [`Config`] is an immutable snapshot for one build: components
//! receive the sections they need by reference or by value. CLI settings can
//! be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.baseurl`
//! - `theme`
//!
//! ## Dotted Lookup
//!
//! [`Config::get`] resolves dotted keys such as `site.paginate.max` against the
//! effective configuration, defaults included.

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the site source directory (paths are re-resolved against it).
    pub source_dir: Option<PathBuf>,
    /// Override the output directory.
    pub output_dir: Option<PathBuf>,
    /// Override the theme name.
    pub theme: Option<String>,
    /// Override the drafts flag.
    pub drafts: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quire.toml";

/// Application configuration.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Site-wide settings exposed to templates.
    pub site: SiteConfig,
    /// Content discovery settings.
    pub content: ContentConfig,
    /// Frontmatter conversion settings.
    pub frontmatter: FrontmatterConfig,
    /// Local layouts directory.
    pub layouts: LayoutsConfig,
    /// Themes directory.
    pub themes: ThemesConfig,
    /// Static files directory.
    #[serde(rename = "static")]
    pub static_files: StaticConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Build behavior.
    pub build: BuildConfig,
    /// Active theme name (a directory under `themes.dir`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Publish pages marked `published: false`.
    pub drafts: bool,

    /// Resolved absolute paths (set after loading).
    #[serde(skip)]
    pub paths: ResolvedPaths,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site settings.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,
    /// Short tagline.
    pub baseline: String,
    /// Absolute base URL of the published site.
    pub baseurl: String,
    /// Site description.
    pub description: String,
    /// Taxonomies, plural name to singular name (e.g. `tags = "tag"`).
    pub taxonomies: BTreeMap<String, String>,
    /// Pagination settings.
    pub paginate: PaginateConfig,
    /// Ordering of terms on taxonomy index pages.
    pub terms_sort: TermsSort,
    /// Menu overrides, menu name to entry specs.
    pub menu: BTreeMap<String, Vec<MenuEntryConfig>>,
    /// Any other `site.*` keys, passed through to templates.
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Quire".to_owned(),
            baseline: "A Quire website".to_owned(),
            baseurl: "http://localhost:8000/".to_owned(),
            description: String::new(),
            taxonomies: BTreeMap::from([
                ("categories".to_owned(), "category".to_owned()),
                ("tags".to_owned(), "tag".to_owned()),
            ]),
            paginate: PaginateConfig::default(),
            terms_sort: TermsSort::default(),
            menu: BTreeMap::new(),
            extra: toml::Table::new(),
        }
    }
}

/// Pagination settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaginateConfig {
    /// Items per page.
    pub max: usize,
    /// Path segment inserted before the page number (`blog/page/2`).
    pub path: String,
    /// Disable pagination entirely.
    pub disabled: bool,
}

impl Default for PaginateConfig {
    fn default() -> Self {
        Self {
            max: 5,
            path: "page".to_owned(),
            disabled: false,
        }
    }
}

/// Ordering of terms on a taxonomy index page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TermsSort {
    /// Order of first occurrence while scanning pages.
    #[default]
    Occurrence,
    /// Alphabetical by term name.
    Name,
    /// Most used terms first, ties in occurrence order.
    Count,
}

/// A menu entry override.
///
/// With `disabled = true` the entry with this `id` is removed from the menu;
/// otherwise the entry is added, replacing any entry with the same `id`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MenuEntryConfig {
    /// Entry identifier (page id for page-derived entries).
    pub id: String,
    /// Display label (defaults to `id`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Link target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Sort weight, ascending.
    #[serde(default)]
    pub weight: i64,
    /// Remove the entry instead of adding it.
    #[serde(default)]
    pub disabled: bool,
}

/// Content discovery settings.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Content directory, relative to the site root.
    pub dir: String,
    /// File extensions treated as content documents.
    pub ext: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: "content".to_owned(),
            ext: vec!["md".to_owned()],
        }
    }
}

/// Frontmatter settings.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FrontmatterConfig {
    /// Frontmatter block format.
    pub format: FrontmatterFormat,
}

/// Supported frontmatter formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontmatterFormat {
    #[default]
    Yaml,
    Toml,
    Json,
}

impl std::fmt::Display for FrontmatterFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// Local layouts directory settings.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutsConfig {
    pub dir: String,
}

impl Default for LayoutsConfig {
    fn default() -> Self {
        Self {
            dir: "layouts".to_owned(),
        }
    }
}

/// Themes directory settings.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemesConfig {
    pub dir: String,
}

impl Default for ThemesConfig {
    fn default() -> Self {
        Self {
            dir: "themes".to_owned(),
        }
    }
}

/// Static files directory settings.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticConfig {
    pub dir: String,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            dir: "static".to_owned(),
        }
    }
}

/// Output settings.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory, relative to the site root.
    pub dir: String,
    /// File name written for extension-less permalinks.
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "_site".to_owned(),
            filename: "index.html".to_owned(),
        }
    }
}

/// Build behavior settings.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// What to do when no layout exists for a page.
    pub on_missing_layout: MissingLayoutPolicy,
}

/// Policy for pages whose layout cannot be resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingLayoutPolicy {
    /// Fail the build.
    #[default]
    Abort,
    /// Skip the page and report it.
    Skip,
}

/// Resolved directories with absolute paths.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Site root (directory of the config file).
    pub source_dir: PathBuf,
    /// Content documents.
    pub content_dir: PathBuf,
    /// Local layout overrides.
    pub layouts_dir: PathBuf,
    /// Directory holding themes.
    pub themes_dir: PathBuf,
    /// Active theme directory, when a theme is set.
    pub theme_dir: Option<PathBuf>,
    /// Static files copied to the output root.
    pub static_dir: PathBuf,
    /// Output directory.
    pub output_dir: PathBuf,
}

impl ResolvedPaths {
    /// Template search paths in priority order: local layouts, then theme layouts.
    #[must_use]
    pub fn layout_search_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.layouts_dir.clone()];
        if let Some(theme_dir) = &self.theme_dir {
            paths.push(theme_dir.join("layouts"));
        }
        paths
    }

    /// Static directories in copy order: theme first, so site files win.
    #[must_use]
    pub fn static_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(theme_dir) = &self.theme_dir {
            dirs.push(theme_dir.join("static"));
        }
        dirs.push(self.static_dir.clone());
        dirs
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
        /// Config field path (e.g., "`site.baseurl`").
        field: String,
        /// Error message (e.g., "${`BASE_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quire.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
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

    /// Parse configuration from TOML text, resolving paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion or validation fails.
    pub fn from_toml_str(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    /// Create default config with paths relative to given base directory.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            site: SiteConfig::default(),
            content: ContentConfig::default(),
            frontmatter: FrontmatterConfig::default(),
            layouts: LayoutsConfig::default(),
            themes: ThemesConfig::default(),
            static_files: StaticConfig::default(),
            output: OutputConfig::default(),
            build: BuildConfig::default(),
            theme: None,
            drafts: false,
            paths: ResolvedPaths::default(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    /// Look up a value by dotted key (e.g. `site.paginate.max`).
    ///
    /// Defaults are included; unknown keys return `None`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<toml::Value> {
        let root = toml::Value::try_from(self).ok()?;
        key.split('.').try_fold(root, |value, segment| match value {
            toml::Value::Table(mut table) => table.remove(segment),
            _ => None,
        })
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(theme) = &settings.theme {
            self.theme = Some(theme.clone());
        }
        if let Some(source_dir) = &settings.source_dir {
            self.resolve_paths(source_dir);
        } else if settings.theme.is_some() {
            let base = self.paths.source_dir.clone();
            self.resolve_paths(&base);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.paths.output_dir.clone_from(output_dir);
        }
        if let Some(drafts) = settings.drafts {
            self.drafts = drafts;
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml_str(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_paginate()?;
        require_non_empty(&self.output.filename, "output.filename")?;
        if self.content.ext.is_empty() {
            return Err(ConfigError::Validation(
                "content.ext must list at least one extension".to_owned(),
            ));
        }
        for (plural, singular) in &self.site.taxonomies {
            require_non_empty(plural, "site.taxonomies")?;
            require_non_empty(singular, &format!("site.taxonomies.{plural}"))?;
        }
        Ok(())
    }

    /// Validate pagination configuration.
    fn validate_paginate(&self) -> Result<(), ConfigError> {
        if self.site.paginate.max == 0 {
            return Err(ConfigError::Validation(
                "site.paginate.max must be greater than 0".to_owned(),
            ));
        }
        require_non_empty(&self.site.paginate.path, "site.paginate.path")
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.baseurl = expand::expand_env(&self.site.baseurl, "site.baseurl")?;
        if let Some(ref theme) = self.theme {
            self.theme = Some(expand::expand_env(theme, "theme")?);
        }
        Ok(())
    }

    /// Resolve relative directories to absolute paths based on the site root.
    fn resolve_paths(&mut self, base: &Path) {
        let themes_dir = base.join(&self.themes.dir);
        self.paths = ResolvedPaths {
            source_dir: base.to_path_buf(),
            content_dir: base.join(&self.content.dir),
            layouts_dir: base.join(&self.layouts.dir),
            theme_dir: self.theme.as_ref().map(|theme| themes_dir.join(theme)),
            themes_dir,
            static_dir: base.join(&self.static_files.dir),
            output_dir: base.join(&self.output.dir),
        };
    }
}
