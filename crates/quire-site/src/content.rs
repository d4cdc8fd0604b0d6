//! Page creation from content documents and the conversion step.

use std::path::Path;

use quire_config::FrontmatterFormat;
use quire_renderer::{MarkdownConverter, urlize};
use serde_json::Value;

use crate::frontmatter::{self, ConversionError};
use crate::menu::MenuSpec;
use crate::page::{NodeType, Page};

/// Create a raw (unconverted) page for a document.
///
/// `path` is relative to the content root. The id is the urlized
/// `dir/stem`; an `index` document takes its directory as pathname.
#[must_use]
pub fn create_page(path: &Path, raw: &str) -> Page {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir_components: Vec<String> = path
        .parent()
        .map(|dir| {
            dir.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    let dir = dir_components.join("/");

    let id = urlize(&format!("{dir}/{stem}"));
    let is_index = stem == "index";
    let pathname = if is_index { urlize(&dir) } else { id.clone() };
    let section = dir_components.first().map(|s| urlize(s)).filter(|s| !s.is_empty());

    let node_type = match (is_index, dir_components.len()) {
        (true, 0) => NodeType::Homepage,
        (true, 1) => NodeType::Section,
        _ => NodeType::Page,
    };

    let (fm, body) = frontmatter::split(raw);

    Page {
        id,
        title: stem.clone(),
        name: stem,
        pathname,
        section,
        node_type,
        source_path: Some(path.to_path_buf()),
        frontmatter: fm.to_owned(),
        body: body.to_owned(),
        ..Page::default()
    }
}

/// Result of converting one page.
#[derive(Debug)]
pub enum Converted {
    /// Page is published.
    Published(Page),
    /// Page carries `published: false` and drafts are off.
    Unpublished(Page),
}

/// Convert a raw page: parse frontmatter, lift well-known keys, render the body.
///
/// With `drafts` set, every page is treated as published.
///
/// # Errors
///
/// Returns [`ConversionError`] if the frontmatter cannot be converted.
pub fn convert_page(
    page: &Page,
    format: FrontmatterFormat,
    drafts: bool,
) -> Result<Converted, ConversionError> {
    let mut converted = page.clone();
    converted.variables = frontmatter::convert(&page.frontmatter, format)?;

    let title = take_string(&mut converted, "title");
    let has_title = title.is_some();
    if let Some(title) = title {
        converted.title = title;
    }
    if let Some(section) = take_string(&mut converted, "section") {
        converted.section = Some(section);
    }
    if let Some(layout) = take_string(&mut converted, "layout") {
        converted.layout = Some(layout);
    }
    if let Some(permalink) = take_string(&mut converted, "permalink") {
        converted.permalink_override = Some(permalink.trim_matches('/').to_owned());
    }
    if let Some(menu) = converted.unset_variable("menu") {
        converted.menu = MenuSpec::from_value(&menu);
        if converted.menu.is_none() {
            tracing::warn!(page = %page.id, "Ignoring malformed menu declaration");
        }
    }
    if let Some(date) = converted.variable("date").cloned() {
        converted.date = frontmatter::parse_date(&date);
        if converted.date.is_none() {
            tracing::warn!(page = %page.id, date = %date, "Unrecognized date format");
        }
    }

    let link_base = page
        .source_path
        .as_deref()
        .and_then(Path::parent)
        .map(|dir| dir.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();
    let rendered = MarkdownConverter::new()
        .with_title_extraction()
        .with_link_base(link_base)
        .convert(&page.body);
    if !has_title
        && let Some(title) = rendered.title
    {
        converted.title = title;
    }
    converted.html = Some(rendered.html);

    if drafts {
        converted.set_variable("published", true);
    }
    let published = converted
        .variable("published")
        .is_none_or(|v| !matches!(v, Value::Bool(false)));
    if !published {
        return Ok(Converted::Unpublished(converted));
    }
    converted.set_variable("published", true);
    Ok(Converted::Published(converted))
}

/// Remove a variable and return it as a non-empty string.
fn take_string(page: &mut Page, key: &str) -> Option<String> {
    match page.variable(key)? {
        Value::String(s) if !s.trim().is_empty() => {
            let s = s.trim().to_owned();
            page.unset_variable(key);
            Some(s)
        }
        Value::Number(n) => {
            let s = n.to_string();
            page.unset_variable(key);
            Some(s)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn published(result: Converted) -> Page {
        match result {
            Converted::Published(page) => page,
            Converted::Unpublished(page) => panic!("page {} not published", page.id),
        }
    }

    #[test]
    fn test_create_root_index() {
        let page = create_page(Path::new("index.md"), "Hello");

        assert_eq!(page.id, "index");
        assert_eq!(page.pathname, "");
        assert_eq!(page.node_type, NodeType::Homepage);
        assert_eq!(page.section, None);
        assert!(!page.is_virtual);
    }

    #[test]
    fn test_create_section_index() {
        let page = create_page(Path::new("Blog/index.md"), "");

        assert_eq!(page.id, "blog/index");
        assert_eq!(page.pathname, "blog");
        assert_eq!(page.node_type, NodeType::Section);
        assert_eq!(page.section.as_deref(), Some("blog"));
    }

    #[test]
    fn test_create_nested_page() {
        let page = create_page(
            Path::new("blog/2024/My Post.md"),
            "---\ntitle: T\n---\nBody",
        );

        assert_eq!(page.id, "blog/2024/my-post");
        assert_eq!(page.pathname, "blog/2024/my-post");
        assert_eq!(page.name, "My Post");
        assert_eq!(page.section.as_deref(), Some("blog"));
        assert_eq!(page.node_type, NodeType::Page);
        assert_eq!(page.frontmatter, "title: T\n");
        assert_eq!(page.body, "Body");
        assert_eq!(page.source_path, Some(PathBuf::from("blog/2024/My Post.md")));
    }

    #[test]
    fn test_create_nested_index_is_page() {
        let page = create_page(Path::new("blog/archive/index.md"), "");

        assert_eq!(page.id, "blog/archive/index");
        assert_eq!(page.pathname, "blog/archive");
        assert_eq!(page.node_type, NodeType::Page);
    }

    #[test]
    fn test_convert_lifts_known_keys() {
        let raw = "---\ntitle: Hello\nsection: news\nlayout: post\npermalink: /custom/url/\n\
                   date: 2024-03-01\nmenu: main\ntags: [a]\n---\nSome *text*";
        let page = create_page(Path::new("blog/hello.md"), raw);

        let converted = published(convert_page(&page, FrontmatterFormat::Yaml, false).unwrap());

        assert_eq!(converted.title, "Hello");
        assert_eq!(converted.section.as_deref(), Some("news"));
        assert_eq!(converted.layout.as_deref(), Some("post"));
        assert_eq!(converted.permalink(), "custom/url");
        assert_eq!(converted.menu, Some(MenuSpec::Single("main".to_owned())));
        assert_eq!(
            converted.date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert!(!converted.has_variable("title"));
        assert!(!converted.has_variable("menu"));
        assert_eq!(converted.variable("date"), Some(&json!("2024-03-01")));
        assert_eq!(converted.variable("tags"), Some(&json!(["a"])));
        assert_eq!(converted.variable("published"), Some(&json!(true)));
        assert_eq!(converted.html.as_deref(), Some("<p>Some <em>text</em></p>\n"));
    }

    #[test]
    fn test_convert_unrecognized_date_kept_as_variable() {
        let page = create_page(Path::new("a.md"), "---\ndate: someday\n---\nBody");

        let converted = published(convert_page(&page, FrontmatterFormat::Yaml, false).unwrap());

        assert_eq!(converted.date, None);
        assert_eq!(converted.variable("date"), Some(&json!("someday")));
    }

    #[test]
    fn test_convert_title_from_heading() {
        let page = create_page(Path::new("about.md"), "# About Us\n\nText");

        let converted = published(convert_page(&page, FrontmatterFormat::Yaml, false).unwrap());

        assert_eq!(converted.title, "About Us");
    }

    #[test]
    fn test_convert_title_falls_back_to_name() {
        let page = create_page(Path::new("about.md"), "Text only");

        let converted = published(convert_page(&page, FrontmatterFormat::Yaml, false).unwrap());

        assert_eq!(converted.title, "about");
    }

    #[test]
    fn test_convert_rewrites_relative_links() {
        let page = create_page(Path::new("blog/a.md"), "[b](b.md)");

        let converted = published(convert_page(&page, FrontmatterFormat::Yaml, false).unwrap());

        assert_eq!(
            converted.html.as_deref(),
            Some("<p><a href=\"/blog/b/\">b</a></p>\n")
        );
    }

    #[test]
    fn test_convert_unpublished() {
        let page = create_page(Path::new("draft.md"), "---\npublished: false\n---\nWIP");

        let result = convert_page(&page, FrontmatterFormat::Yaml, false).unwrap();

        assert!(matches!(result, Converted::Unpublished(_)));
    }

    #[test]
    fn test_convert_drafts_forces_published() {
        let page = create_page(Path::new("draft.md"), "---\npublished: false\n---\nWIP");

        let converted = published(convert_page(&page, FrontmatterFormat::Yaml, true).unwrap());

        assert_eq!(converted.variable("published"), Some(&json!(true)));
    }

    #[test]
    fn test_convert_malformed_frontmatter() {
        let page = create_page(Path::new("bad.md"), "---\ntitle: [oops\n---\nBody");

        let err = convert_page(&page, FrontmatterFormat::Yaml, false).unwrap_err();

        assert!(matches!(err, ConversionError::Parse { .. }));
    }

    #[test]
    fn test_convert_keeps_raw_page_untouched() {
        let page = create_page(Path::new("a.md"), "---\ntitle: A\n---\nBody");

        let _ = convert_page(&page, FrontmatterFormat::Yaml, false).unwrap();

        assert_eq!(page.title, "a");
        assert!(page.variables.is_empty());
        assert!(page.html.is_none());
    }
}
