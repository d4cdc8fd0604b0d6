//! `quire build` command implementation.

use std::path::PathBuf;

use clap::Args;
use quire_site::Progress;

use super::SiteArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new(self.site.verbose);
        let site = self.site.open(self.output_dir)?;

        let paths = &site.config().paths;
        output.info(&format!("Source: {}", paths.content_dir.display()));
        output.info(&format!("Output: {}", paths.output_dir.display()));

        let report = site.build(&mut |progress: &Progress| output.progress(progress))?;
        output.problems(&report.dropped, &report.skipped);

        tracing::info!(
            written = report.written.len(),
            static_files = report.static_files,
            "Build finished"
        );
        output.success(&format!(
            "Built {} page(s) and copied {} static file(s) to {}",
            report.written.len(),
            report.static_files,
            paths.output_dir.display()
        ));
        Ok(())
    }
}
