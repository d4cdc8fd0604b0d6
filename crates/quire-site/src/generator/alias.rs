//! Redirect stubs for page aliases.

use quire_renderer::urlize;
use serde_json::Value;

use super::Generator;
use crate::collection::PageCollection;
use crate::page::{NodeType, Page};

/// Emits one redirect page per entry of a page's `aliases` variable.
///
/// The stub has layout `redirect` and a `destination` variable holding the
/// source page's permalink. Aliases that would shadow a real page are skipped.
#[derive(Debug, Default)]
pub struct Alias;

impl Generator for Alias {
    fn name(&self) -> &'static str {
        "alias"
    }

    fn generate(&self, pages: &PageCollection) -> PageCollection {
        let mut generated = PageCollection::new();
        for page in pages {
            for alias in aliases(page) {
                let id = urlize(alias);
                if id.is_empty() {
                    tracing::warn!(page = %page.id, alias = %alias, "Ignoring empty alias");
                    continue;
                }
                if shadows_page(pages, &id) {
                    tracing::warn!(page = %page.id, alias = %alias, "Alias collides with an existing page");
                    continue;
                }
                let mut redirect = Page::virtual_page(id.clone(), id, NodeType::Page);
                redirect.title = alias.to_owned();
                redirect.layout = Some("redirect".to_owned());
                redirect.set_variable("destination", page.permalink());
                generated.upsert(redirect);
            }
        }
        generated
    }
}

fn aliases(page: &Page) -> Vec<&str> {
    match page.variable("aliases") {
        Some(Value::String(alias)) => vec![alias.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Whether a redirect at `id` would take the id or output location of a
/// real page.
fn shadows_page(pages: &PageCollection, id: &str) -> bool {
    pages
        .iter()
        .filter(|p| !is_redirect(p))
        .any(|p| p.id == id || p.permalink() == id)
}

fn is_redirect(page: &Page) -> bool {
    page.is_virtual && page.layout.as_deref() == Some("redirect")
}
