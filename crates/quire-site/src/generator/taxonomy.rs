//! Taxonomy term and terms-index pages.

use std::collections::BTreeMap;

use quire_config::TermsSort;
use quire_renderer::urlize;
use serde::Serialize;
use serde_json::Value;

use super::Generator;
use crate::collection::PageCollection;
use crate::page::{NodeType, Page, capitalize, pages_value};

/// Builds one TAXONOMY page per term and one TERMS index per taxonomy.
///
/// Taxonomies map plural variable names (`tags`) to singular names (`tag`).
/// A page joins a term through a string or list-of-strings variable; each
/// page is listed once per term.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    taxonomies: BTreeMap<String, String>,
    sort: TermsSort,
}

#[derive(Serialize)]
struct TermEntry {
    name: String,
    permalink: String,
    count: usize,
}

impl Taxonomy {
    #[must_use]
    pub fn new(taxonomies: BTreeMap<String, String>, sort: TermsSort) -> Self {
        Self { taxonomies, sort }
    }

    /// Terms in first-occurrence order with their member pages.
    ///
    /// Spellings that urlize to the same slug share one term; the first
    /// spelling seen names it.
    fn collect_terms<'a>(pages: &'a PageCollection, plural: &str) -> Vec<(String, Vec<&'a Page>)> {
        let mut terms: Vec<(String, String, Vec<&Page>)> = Vec::new();
        for page in pages {
            for term in term_values(page.variable(plural)) {
                let slug = urlize(&term);
                match terms.iter_mut().find(|(key, _, _)| *key == slug) {
                    Some((_, _, members)) => {
                        if !members.iter().any(|p| p.id == page.id) {
                            members.push(page);
                        }
                    }
                    None => terms.push((slug, term, vec![page])),
                }
            }
        }
        terms
            .into_iter()
            .map(|(_, name, members)| (name, members))
            .collect()
    }
}

impl Generator for Taxonomy {
    fn name(&self) -> &'static str {
        "taxonomy"
    }

    fn generate(&self, pages: &PageCollection) -> PageCollection {
        let mut generated = PageCollection::new();

        for (plural, singular) in &self.taxonomies {
            let terms = Self::collect_terms(pages, plural);
            if terms.is_empty() {
                continue;
            }

            let mut entries = Vec::with_capacity(terms.len());
            for (term, members) in &terms {
                let id = urlize(&format!("{plural}/{term}"));
                if id.is_empty() || urlize(term).is_empty() {
                    tracing::warn!(taxonomy = %plural, term = %term, "Ignoring term with empty path");
                    continue;
                }
                if pages.contains(&id) {
                    tracing::warn!(taxonomy = %plural, term = %term, "Term page collides with an existing page");
                    continue;
                }
                let mut page = Page::virtual_page(id.clone(), id.clone(), NodeType::Taxonomy);
                page.title.clone_from(term);
                page.set_variable("pages", pages_value(members.iter().copied()));
                page.set_variable("term", term.as_str());
                page.set_variable("singular", singular.as_str());
                page.set_variable("plural", plural.as_str());
                generated.upsert(page);

                entries.push(TermEntry {
                    name: term.clone(),
                    permalink: id,
                    count: members.len(),
                });
            }

            match self.sort {
                TermsSort::Occurrence => {}
                TermsSort::Name => entries.sort_by_key(|e| e.name.to_lowercase()),
                TermsSort::Count => entries.sort_by(|a, b| b.count.cmp(&a.count)),
            }

            let id = urlize(plural);
            if id.is_empty() || pages.contains(&id) {
                continue;
            }
            let mut index = Page::virtual_page(id.clone(), id, NodeType::Terms);
            index.title = capitalize(plural);
            index.set_variable(
                "terms",
                serde_json::to_value(&entries).unwrap_or(Value::Array(Vec::new())),
            );
            index.set_variable("singular", singular.as_str());
            index.set_variable("plural", plural.as_str());
            generated.upsert(index);
        }

        generated
    }
}

/// Trimmed, non-empty terms of a taxonomy variable.
fn term_values(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<&str> = match value {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}
