//! Title transform.

use super::Generator;
use crate::collection::PageCollection;

/// Emits a clone of every titled page with its title transformed.
///
/// The clones replace their sources on merge. Defaults to uppercasing.
pub struct TitleReplace {
    transform: Box<dyn Fn(&str) -> String>,
}

impl TitleReplace {
    #[must_use]
    pub fn new(transform: impl Fn(&str) -> String + 'static) -> Self {
        Self {
            transform: Box::new(transform),
        }
    }
}

impl Default for TitleReplace {
    fn default() -> Self {
        Self::new(str::to_uppercase)
    }
}

impl std::fmt::Debug for TitleReplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitleReplace").finish_non_exhaustive()
    }
}

impl Generator for TitleReplace {
    fn name(&self) -> &'static str {
        "title_replace"
    }

    fn generate(&self, pages: &PageCollection) -> PageCollection {
        let mut generated = PageCollection::new();
        for page in pages.iter().filter(|p| !p.title.is_empty()) {
            let mut altered = page.clone();
            altered.title = (self.transform)(&page.title);
            generated.upsert(altered);
        }
        generated
    }
}
