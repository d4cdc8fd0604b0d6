//! Terminal reporting for site commands.

use console::{Style, Term};
use quire_site::{DroppedDocument, PlannedPage, Progress, SkippedPage, Step};

/// Writes build progress and reports to stderr.
pub(crate) struct Output {
    term: Term,
    verbose: bool,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new(verbose: bool) -> Self {
        Self {
            term: Term::stderr(),
            verbose,
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    fn line(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    fn styled(&self, style: &Style, msg: &str) {
        self.line(&style.apply_to(msg).to_string());
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.styled(&self.green, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.styled(&self.red, msg);
    }

    /// Report one pipeline notification.
    ///
    /// Failures are always shown. Generator and copy messages need `verbose`.
    pub(crate) fn progress(&self, progress: &Progress) {
        if let Some(line) = progress_line(progress, self.verbose) {
            if progress.failed {
                self.styled(&self.yellow, &line);
            } else {
                self.line(&line);
            }
        }
    }

    /// Report documents and pages left out of the build.
    pub(crate) fn problems(&self, dropped: &[DroppedDocument], skipped: &[SkippedPage]) {
        for line in problem_lines(dropped, skipped) {
            self.styled(&self.yellow, &line);
        }
    }

    /// List planned renders between rules.
    pub(crate) fn plan(&self, renders: &[PlannedPage]) {
        let rule = "=".repeat(70);
        self.line(&rule);
        for planned in renders {
            self.line(&plan_line(planned));
        }
        self.line(&rule);
    }

    pub(crate) fn highlight(&self, msg: &str) {
        self.styled(&self.cyan_bold, msg);
    }
}

fn progress_line(progress: &Progress, verbose: bool) -> Option<String> {
    if progress.failed {
        return Some(format!("  {}: {}", progress.step, progress.message));
    }
    if verbose && matches!(progress.step, Step::Generate | Step::Copy) {
        return Some(format!("  {}: {}", progress.step, progress.message));
    }
    match (progress.current, progress.total) {
        (Some(current), Some(total)) if current == total => {
            Some(format!("  {}: {total} item(s)", progress.step))
        }
        _ => None,
    }
}

fn problem_lines(dropped: &[DroppedDocument], skipped: &[SkippedPage]) -> Vec<String> {
    dropped
        .iter()
        .map(|d| format!("Dropped {}: {}", d.path.display(), d.reason))
        .chain(
            skipped
                .iter()
                .map(|s| format!("Skipped {}: {}", s.page_id, s.error)),
        )
        .collect()
}

fn plan_line(planned: &PlannedPage) -> String {
    format!(
        "{} -> {} ({})",
        planned.page_id,
        planned.template,
        planned.output_path.display()
    )
}
