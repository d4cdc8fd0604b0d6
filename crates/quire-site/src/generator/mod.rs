//! Virtual page generators.
//!
//! A [`Generator`] reads a collection and returns only the pages it
//! synthesizes or decorates. [`GeneratorPipeline`] runs generators in
//! ascending priority; every generator sees the pipeline's original input,
//! never the output of generators that ran before it. Compose across
//! generators by running several pipelines in sequence.

mod alias;
mod homepage;
mod pagination;
mod section;
mod taxonomy;
mod title_replace;

pub use alias::Alias;
pub use homepage::Homepage;
pub use pagination::Pagination;
pub use section::Section;
pub use taxonomy::Taxonomy;
pub use title_replace::TitleReplace;

use crate::collection::PageCollection;
use crate::progress::{Progress, ProgressFn, Step};

/// A source of virtual pages.
pub trait Generator {
    /// Short name for logs and progress messages.
    fn name(&self) -> &'static str;

    /// Produce new or decorated pages from `pages` without modifying it.
    ///
    /// A returned page whose id exists in the input replaces it on merge.
    fn generate(&self, pages: &PageCollection) -> PageCollection;
}

/// Ordered set of generators.
#[derive(Default)]
pub struct GeneratorPipeline {
    generators: Vec<(i32, Box<dyn Generator>)>,
}

impl GeneratorPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator. Equal priorities run in registration order.
    pub fn add(&mut self, priority: i32, generator: impl Generator + 'static) {
        self.generators.push((priority, Box::new(generator)));
    }

    /// Builder form of [`add`](Self::add).
    #[must_use]
    pub fn with(mut self, priority: i32, generator: impl Generator + 'static) -> Self {
        self.add(priority, generator);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Run every generator against `pages` and collect their output.
    ///
    /// Later generators win when two emit the same id.
    pub fn run(&self, pages: &PageCollection, progress: &mut ProgressFn<'_>) -> PageCollection {
        let mut order: Vec<&(i32, Box<dyn Generator>)> = self.generators.iter().collect();
        order.sort_by_key(|(priority, _)| *priority);

        let total = order.len();
        let mut generated = PageCollection::new();
        for (current, (_, generator)) in order.into_iter().enumerate() {
            let output = generator.generate(pages);
            tracing::debug!(generator = generator.name(), pages = output.len(), "Generator finished");
            progress(
                &Progress::new(
                    Step::Generate,
                    format!("{}: {} page(s)", generator.name(), output.len()),
                )
                .with_count(current + 1, total),
            );
            generated.merge(output);
        }
        generated
    }
}
