//! Site root page.

use super::Generator;
use crate::collection::PageCollection;
use crate::menu::MenuSpec;
use crate::page::{NodeType, Page, pages_value};

const HOMEPAGE_ID: &str = "index";

/// Guarantees exactly one HOMEPAGE listing every content page.
///
/// Without a content-defined homepage a virtual one is synthesized at the
/// root, titled "Home" and placed in the `main` menu.
#[derive(Debug, Default)]
pub struct Homepage;

impl Generator for Homepage {
    fn name(&self) -> &'static str {
        "homepage"
    }

    fn generate(&self, pages: &PageCollection) -> PageCollection {
        let mut generated = PageCollection::new();
        let listing = || pages_value(pages.iter().filter(|p| p.node_type == NodeType::Page));

        match pages.iter().find(|p| p.node_type == NodeType::Homepage) {
            Some(home) if home.has_variable("pages") => {}
            Some(home) => {
                let mut decorated = home.clone();
                decorated.set_variable("pages", listing());
                generated.upsert(decorated);
            }
            None => {
                let mut home = Page::virtual_page(HOMEPAGE_ID, "", NodeType::Homepage);
                home.title = "Home".to_owned();
                home.menu = Some(MenuSpec::Multiple(vec![("main".to_owned(), 1)]));
                home.set_variable("pages", listing());
                generated.upsert(home);
            }
        }
        generated
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn content() -> PageCollection {
        let mut pages = PageCollection::new();
        let mut about = Page::new("about");
        about.pathname = "about".to_owned();
        pages.add(about).unwrap();
        let mut section = Page::new("blog/index");
        section.node_type = NodeType::Section;
        pages.add(section).unwrap();
        pages
    }

    #[test]
    fn test_synthesizes_homepage() {
        let out = Homepage.generate(&content());

        assert_eq!(out.len(), 1);
        let home = out.get("index").unwrap();
        assert_eq!(home.pathname, "");
        assert_eq!(home.title, "Home");
        assert_eq!(home.node_type, NodeType::Homepage);
        assert!(home.is_virtual);
        assert_eq!(home.menu, Some(MenuSpec::Multiple(vec![("main".to_owned(), 1)])));
        assert_eq!(home.variable("pages").unwrap()[0]["id"], json!("about"));
        assert_eq!(home.variable("pages").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_decorates_existing_homepage() {
        let mut pages = content();
        let mut home = Page::new("index");
        home.node_type = NodeType::Homepage;
        home.title = "Welcome".to_owned();
        pages.add(home).unwrap();

        let out = Homepage.generate(&pages);

        let home = out.get("index").unwrap();
        assert_eq!(home.title, "Welcome");
        assert!(!home.is_virtual);
        assert!(home.has_variable("pages"));
    }

    #[test]
    fn test_existing_listing_untouched() {
        let mut pages = content();
        let mut home = Page::new("index");
        home.node_type = NodeType::Homepage;
        home.set_variable("pages", json!([]));
        pages.add(home).unwrap();

        assert!(Homepage.generate(&pages).is_empty());
    }
}
