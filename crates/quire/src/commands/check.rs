//! `quire check` command implementation.

use clap::Args;
use quire_site::Progress;

use super::SiteArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Fail when any document was dropped or page skipped.
    #[arg(long)]
    strict: bool,
}

impl CheckArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new(self.site.verbose);
        let site = self.site.open(None)?;

        let plan = site.plan(&mut |progress: &Progress| output.progress(progress))?;

        output.plan(&plan.renders);
        output.problems(&plan.dropped, &plan.skipped);

        let problems = plan.dropped.len() + plan.skipped.len();
        if problems > 0 {
            tracing::debug!(problems, strict = self.strict, "Check found problems");
        }
        if self.strict && problems > 0 {
            return Err(CliError::Validation(format!(
                "{problems} problem(s) found"
            )));
        }

        output.highlight(&format!("{} page(s) ready to render", plan.renders.len()));
        Ok(())
    }
}
