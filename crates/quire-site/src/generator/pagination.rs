//! Pagination of listing pages.

use quire_config::PaginateConfig;
use quire_renderer::urlize;
use serde_json::{Map, Value};

use super::Generator;
use crate::collection::PageCollection;
use crate::page::{NodeType, Page};

/// Splits the `pages` list of HOMEPAGE and SECTION pages into fixed-size slices.
///
/// The first slice reuses the listing page's own id and pathname and gains
/// an alias `<path>/<paginate.path>/1`. Slice `n > 1` is a new page at
/// `<path>/<paginate.path>/<n>` that never joins menus. Every slice gets a
/// `pagination` variable: `{pages, prev?, next?, current, total}`.
#[derive(Debug, Clone)]
pub struct Pagination {
    config: PaginateConfig,
}

impl Pagination {
    #[must_use]
    pub fn new(config: PaginateConfig) -> Self {
        Self { config }
    }

    fn link(&self, path: &str, number: usize) -> String {
        urlize(&format!("{path}/{}/{number}", self.config.path))
    }

    fn paginate(&self, page: &Page, items: &[Value], generated: &mut PageCollection) {
        let max = self.config.max;
        let count = items.len().div_ceil(max);
        let path = page.pathname.clone();

        for (i, slice) in items.chunks(max).enumerate() {
            let mut altered = page.clone();
            if i == 0 {
                let mut aliases = match altered.unset_variable("aliases") {
                    Some(Value::Array(existing)) => existing,
                    Some(Value::String(alias)) => vec![Value::String(alias)],
                    _ => Vec::new(),
                };
                aliases.push(Value::String(self.link(&path, 1)));
                altered.set_variable("aliases", aliases);
            } else {
                let link = self.link(&path, i + 1);
                altered.id.clone_from(&link);
                altered.pathname = link;
                altered.permalink_override = None;
                altered.is_virtual = true;
                altered.menu = None;
                altered.unset_variable("menu");
                altered.unset_variable("aliases");
            }

            let mut pagination = Map::new();
            pagination.insert("pages".to_owned(), Value::Array(slice.to_vec()));
            if i > 0 {
                pagination.insert("prev".to_owned(), Value::String(self.link(&path, i)));
            }
            if i + 1 < count {
                pagination.insert("next".to_owned(), Value::String(self.link(&path, i + 2)));
            }
            pagination.insert("current".to_owned(), Value::from(i + 1));
            pagination.insert("total".to_owned(), Value::from(count));
            altered.set_variable("pagination", pagination);

            generated.upsert(altered);
        }
    }
}

impl Generator for Pagination {
    fn name(&self) -> &'static str {
        "pagination"
    }

    fn generate(&self, pages: &PageCollection) -> PageCollection {
        let mut generated = PageCollection::new();
        if self.config.disabled || self.config.max == 0 {
            return generated;
        }

        let listings = pages
            .filter(|p| matches!(p.node_type, NodeType::Homepage | NodeType::Section));
        for page in &listings {
            let Some(Value::Array(items)) = page.variable("pages") else {
                continue;
            };
            if items.len() <= self.config.max {
                continue;
            }
            tracing::debug!(page = %page.id, items = items.len(), "Paginating");
            self.paginate(page, items, &mut generated);
        }
        generated
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn section(count: usize) -> Page {
        let mut page = Page::new("blog/index");
        page.pathname = "blog".to_owned();
        page.title = "Blog".to_owned();
        page.node_type = NodeType::Section;
        page.section = Some("blog".to_owned());
        page.set_variable("menu", "main");
        let items: Vec<Value> = (0..count).map(|i| json!({"id": format!("blog/p{i}")})).collect();
        page.set_variable("pages", items);
        page
    }

    fn generate(page: Page, config: PaginateConfig) -> PageCollection {
        let mut pages = PageCollection::new();
        pages.add(page).unwrap();
        Pagination::new(config).generate(&pages)
    }

    fn slice_ids(page: &Page) -> Vec<String> {
        page.variable("pagination").unwrap()["pages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap().to_owned())
            .collect()
    }

    #[test]
    fn test_twelve_items_five_per_page() {
        let out = generate(section(12), PaginateConfig::default());

        let ids: Vec<_> = out.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["blog/index", "blog/page/2", "blog/page/3"]);

        let first = out.get("blog/index").unwrap();
        let second = out.get("blog/page/2").unwrap();
        let third = out.get("blog/page/3").unwrap();

        assert_eq!(first.pathname, "blog");
        assert_eq!(first.variable("aliases"), Some(&json!(["blog/page/1"])));
        assert_eq!(first.variable("pagination").unwrap().get("prev"), None);
        assert_eq!(first.variable("pagination").unwrap()["next"], json!("blog/page/2"));

        assert_eq!(second.pathname, "blog/page/2");
        assert_eq!(second.variable("pagination").unwrap()["prev"], json!("blog/page/1"));
        assert_eq!(second.variable("pagination").unwrap()["next"], json!("blog/page/3"));

        assert_eq!(third.variable("pagination").unwrap()["prev"], json!("blog/page/2"));
        assert_eq!(third.variable("pagination").unwrap().get("next"), None);
        assert_eq!(third.variable("pagination").unwrap()["total"], json!(3));

        let sizes: Vec<_> = out.iter().map(|p| slice_ids(p).len()).collect();
        assert_eq!(sizes, vec![5, 5, 2]);
    }

    #[test]
    fn test_slices_partition_in_order() {
        let out = generate(section(12), PaginateConfig::default());

        let all: Vec<String> = out.iter().flat_map(slice_ids).collect();
        let expected: Vec<String> = (0..12).map(|i| format!("blog/p{i}")).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_later_pages_leave_menus() {
        let out = generate(section(7), PaginateConfig::default());

        assert_eq!(out.get("blog/index").unwrap().variable("menu"), Some(&json!("main")));
        let second = out.get("blog/page/2").unwrap();
        assert!(!second.has_variable("menu"));
        assert!(!second.has_variable("aliases"));
        assert!(second.is_virtual);
        assert_eq!(second.node_type, NodeType::Section);
    }

    #[test]
    fn test_no_pages_when_within_limit() {
        assert!(generate(section(5), PaginateConfig::default()).is_empty());
        assert!(generate(section(0), PaginateConfig::default()).is_empty());
    }

    #[test]
    fn test_disabled() {
        let config = PaginateConfig {
            disabled: true,
            ..PaginateConfig::default()
        };

        assert!(generate(section(12), config).is_empty());
    }

    #[test]
    fn test_custom_path_on_homepage() {
        let mut home = section(3);
        home.id = "index".to_owned();
        home.pathname = String::new();
        home.node_type = NodeType::Homepage;
        let config = PaginateConfig {
            max: 2,
            path: "p".to_owned(),
            disabled: false,
        };

        let out = generate(home, config);

        let ids: Vec<_> = out.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["index", "p/2"]);
        assert_eq!(out.get("index").unwrap().variable("aliases"), Some(&json!(["p/1"])));
    }

    #[test]
    fn test_ignores_plain_pages() {
        let mut plain = section(12);
        plain.node_type = NodeType::Page;

        assert!(generate(plain, PaginateConfig::default()).is_empty());
    }

    #[test]
    fn test_appends_to_existing_aliases() {
        let mut page = section(6);
        page.set_variable("aliases", json!(["old-blog"]));

        let out = generate(page, PaginateConfig::default());

        assert_eq!(
            out.get("blog/index").unwrap().variable("aliases"),
            Some(&json!(["old-blog", "blog/page/1"]))
        );
    }
}
