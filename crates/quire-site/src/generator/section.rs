//! Section index pages.

use quire_renderer::urlize;

use super::Generator;
use crate::collection::PageCollection;
use crate::page::{NodeType, Page, capitalize, pages_value};

/// Ensures every content section has a SECTION page listing its members.
///
/// Sections without an explicit index get a virtual one. An explicit index
/// lacking a `pages` variable is emitted as a clone carrying the list.
#[derive(Debug, Default)]
pub struct Section;

impl Generator for Section {
    fn name(&self) -> &'static str {
        "section"
    }

    fn generate(&self, pages: &PageCollection) -> PageCollection {
        let mut groups: Vec<(&str, Vec<&Page>)> = Vec::new();
        for page in pages.iter().filter(|p| p.node_type == NodeType::Page) {
            let Some(section) = page.section.as_deref() else {
                continue;
            };
            match groups.iter_mut().find(|(name, _)| *name == section) {
                Some((_, members)) => members.push(page),
                None => groups.push((section, vec![page])),
            }
        }

        let mut generated = PageCollection::new();
        for (name, members) in &groups {
            let explicit = pages
                .iter()
                .find(|p| p.node_type == NodeType::Section && p.section.as_deref() == Some(*name));
            match explicit {
                Some(index) if index.has_variable("pages") => {}
                Some(index) => {
                    let mut decorated = index.clone();
                    decorated.set_variable("pages", pages_value(members.iter().copied()));
                    generated.upsert(decorated);
                }
                None => {
                    let pathname = urlize(name);
                    if pathname.is_empty() {
                        continue;
                    }
                    let mut page = Page::virtual_page(
                        urlize(&format!("{name}/index")),
                        pathname,
                        NodeType::Section,
                    );
                    page.title = capitalize(name);
                    page.section = Some((*name).to_owned());
                    page.set_variable("pages", pages_value(members.iter().copied()));
                    generated.upsert(page);
                }
            }
        }

        for index in pages.iter().filter(|p| {
            p.node_type == NodeType::Section
                && !p.has_variable("pages")
                && !groups.iter().any(|(name, _)| p.section.as_deref() == Some(*name))
        }) {
            let mut decorated = index.clone();
            decorated.set_variable("pages", serde_json::Value::Array(Vec::new()));
            generated.upsert(decorated);
        }

        generated
    }
}
