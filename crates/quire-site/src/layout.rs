//! Layout resolution.
//!
//! Builds the candidate template list for a page from its node type, then
//! probes the search paths in priority order. The first `(path, candidate)`
//! pair that exists wins.

use std::path::{Component, Path, PathBuf};

use quire_templates::REDIRECT_TEMPLATE;

use crate::page::{NodeType, Page};

const TEMPLATE_EXT: &str = ".html";
const REDIRECT_HINT: &str = "redirect";

/// Layout resolution error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LayoutError {
    /// No candidate exists in any search path.
    #[error("No layout for page '{page_id}' (last candidate tried: {candidate})")]
    NotFound { page_id: String, candidate: String },
}

/// Existence check for a template file.
pub trait TemplateProbe {
    fn exists(&self, path: &Path) -> bool;
}

impl<F: Fn(&Path) -> bool> TemplateProbe for F {
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Probe backed by the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl TemplateProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Ordered template candidates for a page, most specific first.
///
/// A `redirect` layout hint yields the built-in redirect template only.
#[must_use]
pub fn candidates(page: &Page) -> Vec<String> {
    if is_redirect(page) {
        return vec![REDIRECT_TEMPLATE.to_owned()];
    }
    let hint = page
        .layout
        .as_deref()
        .map(strip_extension)
        .filter(|hint| is_plain_hint(page, hint));

    let singular = page.variable("singular").and_then(|v| v.as_str());
    let names: Vec<String> = match page.node_type {
        NodeType::Homepage => vec!["index".into(), "_default/list".into(), "_default/page".into()],
        NodeType::Section => {
            let name = page
                .section
                .as_deref()
                .or_else(|| page.pathname.split('/').next())
                .filter(|s| !s.is_empty());
            let mut names = Vec::with_capacity(3);
            if let Some(name) = name {
                names.push(format!("section/{name}"));
            }
            names.extend(["_default/section".into(), "_default/list".into()]);
            names
        }
        NodeType::Taxonomy => {
            let mut names = Vec::with_capacity(3);
            if let Some(singular) = singular {
                names.push(format!("taxonomy/{singular}"));
            }
            names.extend(["_default/taxonomy".into(), "_default/list".into()]);
            names
        }
        NodeType::Terms => {
            let mut names = Vec::with_capacity(2);
            if let Some(singular) = singular {
                names.push(format!("taxonomy/{singular}.terms"));
            }
            names.push("_default/terms".into());
            names
        }
        NodeType::Page => {
            let mut names = Vec::with_capacity(4);
            match page.section.as_deref() {
                Some(section) => {
                    if let Some(hint) = hint {
                        names.push(format!("{section}/{hint}"));
                    }
                    names.push(format!("{section}/page"));
                }
                None => {
                    if let Some(hint) = hint {
                        names.push(hint.to_owned());
                    }
                }
            }
            names.extend(["page".into(), "_default/page".into()]);
            names
        }
    };

    names.into_iter().map(|n| format!("{n}{TEMPLATE_EXT}")).collect()
}

/// Resolve the template for a page.
///
/// Walks `search_paths` in order and, within each, the candidates in order.
///
/// # Errors
///
/// Returns [`LayoutError::NotFound`] when no candidate exists in any path.
pub fn resolve(
    page: &Page,
    search_paths: &[PathBuf],
    probe: &impl TemplateProbe,
) -> Result<String, LayoutError> {
    if is_redirect(page) {
        return Ok(REDIRECT_TEMPLATE.to_owned());
    }

    let candidates = candidates(page);

    for dir in search_paths {
        for candidate in &candidates {
            if probe.exists(&dir.join(candidate)) {
                tracing::debug!(page = %page.id, template = %candidate, dir = %dir.display(), "Resolved layout");
                return Ok(candidate.clone());
            }
        }
    }

    Err(LayoutError::NotFound {
        page_id: page.id.clone(),
        candidate: candidates.last().cloned().unwrap_or_default(),
    })
}

fn is_redirect(page: &Page) -> bool {
    page.layout.as_deref().map(strip_extension) == Some(REDIRECT_HINT)
}

/// Whether a layout hint is a relative path made of plain segments only.
fn is_plain_hint(page: &Page, hint: &str) -> bool {
    let plain = !hint.is_empty()
        && Path::new(hint)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !plain {
        tracing::warn!(page = %page.id, layout = %hint, "Ignoring layout outside the layout directories");
    }
    plain
}

fn strip_extension(hint: &str) -> &str {
    let hint = hint.trim_matches('/');
    let hint = hint.strip_suffix(".twig").unwrap_or(hint);
    hint.strip_suffix(TEMPLATE_EXT).unwrap_or(hint)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn page(node_type: NodeType, section: Option<&str>, layout: Option<&str>) -> Page {
        let mut page = Page::new("p");
        page.node_type = node_type;
        page.section = section.map(str::to_owned);
        page.layout = layout.map(str::to_owned);
        page
    }

    fn set_probe(files: &[&str]) -> impl Fn(&Path) -> bool {
        let files: HashSet<PathBuf> = files.iter().map(PathBuf::from).collect();
        move |path: &Path| files.contains(path)
    }

    #[test]
    fn test_candidates_homepage() {
        assert_eq!(
            candidates(&page(NodeType::Homepage, None, None)),
            vec!["index.html", "_default/list.html", "_default/page.html"]
        );
    }

    #[test]
    fn test_candidates_section() {
        assert_eq!(
            candidates(&page(NodeType::Section, Some("blog"), None)),
            vec!["section/blog.html", "_default/section.html", "_default/list.html"]
        );
    }

    #[test]
    fn test_candidates_section_from_pathname() {
        let mut section = page(NodeType::Section, None, None);
        section.pathname = "docs".to_owned();

        assert_eq!(candidates(&section)[0], "section/docs.html");
    }

    #[test]
    fn test_candidates_taxonomy_and_terms() {
        let mut term = page(NodeType::Taxonomy, None, None);
        term.set_variable("singular", "tag");
        let mut terms = page(NodeType::Terms, None, None);
        terms.set_variable("singular", "tag");

        assert_eq!(
            candidates(&term),
            vec!["taxonomy/tag.html", "_default/taxonomy.html", "_default/list.html"]
        );
        assert_eq!(
            candidates(&terms),
            vec!["taxonomy/tag.terms.html", "_default/terms.html"]
        );
    }

    #[test]
    fn test_candidates_page_with_section_and_hint() {
        assert_eq!(
            candidates(&page(NodeType::Page, Some("blog"), Some("post.html"))),
            vec![
                "blog/post.html",
                "blog/page.html",
                "page.html",
                "_default/page.html"
            ]
        );
        assert_eq!(
            candidates(&page(NodeType::Page, Some("blog"), None)),
            vec!["blog/page.html", "page.html", "_default/page.html"]
        );
    }

    #[test]
    fn test_candidates_page_without_section() {
        assert_eq!(
            candidates(&page(NodeType::Page, None, Some("landing.twig"))),
            vec!["landing.html", "page.html", "_default/page.html"]
        );
        assert_eq!(
            candidates(&page(NodeType::Page, None, None)),
            vec!["page.html", "_default/page.html"]
        );
    }

    #[test]
    fn test_hint_escaping_layouts_ignored() {
        let escaping = page(NodeType::Page, None, Some("../secret.html"));

        assert_eq!(candidates(&escaping), vec!["page.html", "_default/page.html"]);
        assert_eq!(
            resolve(
                &escaping,
                &[PathBuf::from("/site/layouts")],
                &set_probe(&["/site/layouts/../secret.html", "/site/layouts/page.html"]),
            ),
            Ok("page.html".to_owned())
        );
        assert_eq!(
            candidates(&page(NodeType::Page, Some("blog"), Some("/"))),
            vec!["blog/page.html", "page.html", "_default/page.html"]
        );
    }

    #[test]
    fn test_redirect_short_circuits() {
        for node_type in [NodeType::Page, NodeType::Section, NodeType::Homepage] {
            let redirect = page(node_type, Some("blog"), Some("redirect"));

            assert_eq!(
                resolve(&redirect, &[], &set_probe(&[])),
                Ok(REDIRECT_TEMPLATE.to_owned())
            );
        }
    }

    #[test]
    fn test_section_specific_wins() {
        let section = page(NodeType::Section, Some("blog"), None);
        let probe = set_probe(&["layouts/section/blog.html", "layouts/_default/section.html"]);

        let template = resolve(&section, &[PathBuf::from("layouts")], &probe).unwrap();

        assert_eq!(template, "section/blog.html");
    }

    #[test]
    fn test_section_falls_back_to_default() {
        let section = page(NodeType::Section, Some("blog"), None);
        let probe = set_probe(&["layouts/_default/section.html"]);

        let template = resolve(&section, &[PathBuf::from("layouts")], &probe).unwrap();

        assert_eq!(template, "_default/section.html");
    }

    #[test]
    fn test_search_path_priority_beats_specificity() {
        let section = page(NodeType::Section, Some("blog"), None);
        let probe = set_probe(&[
            "local/_default/list.html",
            "theme/section/blog.html",
        ]);

        let template = resolve(
            &section,
            &[PathBuf::from("local"), PathBuf::from("theme")],
            &probe,
        )
        .unwrap();

        assert_eq!(template, "_default/list.html");
    }

    #[test]
    fn test_theme_used_when_local_missing() {
        let plain = page(NodeType::Page, None, None);
        let probe = set_probe(&["theme/_default/page.html"]);

        let template = resolve(
            &plain,
            &[PathBuf::from("local"), PathBuf::from("theme")],
            &probe,
        )
        .unwrap();

        assert_eq!(template, "_default/page.html");
    }

    #[test]
    fn test_not_found_reports_last_candidate() {
        let mut plain = page(NodeType::Page, Some("blog"), None);
        plain.id = "blog/post".to_owned();

        let err = resolve(&plain, &[PathBuf::from("layouts")], &set_probe(&[])).unwrap_err();

        assert_eq!(
            err,
            LayoutError::NotFound {
                page_id: "blog/post".to_owned(),
                candidate: "_default/page.html".to_owned(),
            }
        );
    }

    #[test]
    fn test_fs_probe() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("section")).unwrap();
        fs::write(dir.path().join("section/blog.html"), "").unwrap();
        let section = page(NodeType::Section, Some("blog"), None);

        let template = resolve(&section, &[dir.path().to_path_buf()], &FsProbe).unwrap();

        assert_eq!(template, "section/blog.html");
    }
}
