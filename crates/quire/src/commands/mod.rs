//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod check;

use std::path::PathBuf;

use clap::Args;
use quire_config::{CliSettings, Config};
use quire_site::Site;

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use check::CheckArgs;

/// Arguments shared by commands that load a site.
#[derive(Args)]
pub(crate) struct SiteArgs {
    /// Path to configuration file (default: auto-discover quire.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site source directory (overrides the config file location).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Theme name (overrides config).
    #[arg(short, long, env = "QUIRE_THEME")]
    theme: Option<String>,

    /// Include pages marked `published: false`.
    #[arg(long)]
    drafts: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl SiteArgs {
    /// Load the configuration and open the site.
    fn open(&self, output_dir: Option<PathBuf>) -> Result<Site, CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            output_dir,
            theme: self.theme.clone(),
            drafts: self.drafts.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(
            content_dir = %config.paths.content_dir.display(),
            theme = config.theme.as_deref().unwrap_or("-"),
            drafts = config.drafts,
            "Configuration loaded"
        );
        Ok(Site::open(config)?)
    }
}
