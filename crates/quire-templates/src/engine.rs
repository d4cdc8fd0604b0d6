//! Template environment over ordered search paths.

use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, ErrorKind};

use crate::filters;

/// Name of the built-in redirect template used by alias pages.
pub const REDIRECT_TEMPLATE: &str = "redirect.html";

const REDIRECT_SOURCE: &str = r#"<!DOCTYPE html>
<html>
<head lang="en">
    <link rel="canonical" href="{{ url(page.destination) }}"/>
    <meta http-equiv="content-type" content="text/html; charset=utf-8" />
    <meta http-equiv="refresh" content="0;url={{ url(page.destination) }}" />
</head>
</html>
"#;

/// Template error.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// No search path holds the template.
    #[error("Template not found: {0}")]
    NotFound(String),
    /// Template failed to parse or render.
    #[error("Failed to render template {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Renders a named template with a context.
pub trait TemplateRenderer {
    /// Render `name` with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if the template is missing or fails to render.
    fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, TemplateError>;
}

/// Template environment.
///
/// Templates are looked up by name in each search path in order; the first
/// match wins. `{% extends %}` and `{% include %}` use the same lookup, so a
/// local layout can extend a theme's base layout.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Create an environment over `search_paths`, building URLs under `baseurl`.
    #[must_use]
    pub fn new(search_paths: Vec<PathBuf>, baseurl: &str) -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);

        env.set_loader(move |name| load_template(&search_paths, name));

        let base = baseurl.to_owned();
        env.add_function("url", move |path: String| filters::url(&base, &path));
        let base = baseurl.to_owned();
        env.add_filter("url", move |path: String| filters::url(&base, &path));
        env.add_filter("excerpt", filters::excerpt);
        env.add_filter("urlize", filters::urlize);
        env.add_filter("date", filters::date);

        Self { env }
    }
}

impl TemplateRenderer for Templates {
    fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, TemplateError> {
        let template = self.env.get_template(name).map_err(|e| {
            if e.kind() == ErrorKind::TemplateNotFound {
                TemplateError::NotFound(name.to_owned())
            } else {
                TemplateError::Render {
                    name: name.to_owned(),
                    source: e,
                }
            }
        })?;

        template.render(context).map_err(|e| TemplateError::Render {
            name: name.to_owned(),
            source: e,
        })
    }
}

/// Find the first search path holding `name`.
fn find_template(search_paths: &[PathBuf], name: &str) -> Option<PathBuf> {
    if Path::new(name)
        .components()
        .any(|c| !matches!(c, std::path::Component::Normal(_)))
    {
        return None;
    }
    search_paths
        .iter()
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
}

fn load_template(search_paths: &[PathBuf], name: &str) -> Result<Option<String>, minijinja::Error> {
    let Some(path) = find_template(search_paths, name) else {
        if name == REDIRECT_TEMPLATE {
            return Ok(Some(REDIRECT_SOURCE.to_owned()));
        }
        return Ok(None);
    };

    tracing::debug!(template = name, path = %path.display(), "Loading template");
    std::fs::read_to_string(&path).map(Some).map_err(|e| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("could not read template {}", path.display()),
        )
        .with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_render_from_search_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "page.html", "<h1>{{ page.title }}</h1>{{ page.content }}");

        let templates = Templates::new(vec![dir.path().to_path_buf()], "https://example.com/");
        let html = templates
            .render(
                "page.html",
                &json!({"page": {"title": "Hi", "content": "<p>Body</p>"}}),
            )
            .unwrap();

        assert_eq!(html, "<h1>Hi</h1><p>Body</p>");
    }

    #[test]
    fn test_first_search_path_wins() {
        let local = tempfile::tempdir().unwrap();
        let theme = tempfile::tempdir().unwrap();
        write(local.path(), "page.html", "local");
        write(theme.path(), "page.html", "theme");
        write(theme.path(), "_default/list.html", "theme list");

        let templates = Templates::new(
            vec![local.path().to_path_buf(), theme.path().to_path_buf()],
            "/",
        );

        assert_eq!(templates.render("page.html", &json!({})).unwrap(), "local");
        assert_eq!(
            templates.render("_default/list.html", &json!({})).unwrap(),
            "theme list"
        );
    }

    #[test]
    fn test_local_layout_extends_theme_base() {
        let local = tempfile::tempdir().unwrap();
        let theme = tempfile::tempdir().unwrap();
        write(
            theme.path(),
            "_default/baseof.html",
            "<main>{% block main %}{% endblock %}</main>",
        );
        write(
            local.path(),
            "page.html",
            "{% extends \"_default/baseof.html\" %}{% block main %}{{ page.title }}{% endblock %}",
        );

        let templates = Templates::new(
            vec![local.path().to_path_buf(), theme.path().to_path_buf()],
            "/",
        );

        let html = templates
            .render("page.html", &json!({"page": {"title": "T"}}))
            .unwrap();
        assert_eq!(html, "<main>T</main>");
    }

    #[test]
    fn test_builtin_redirect() {
        let templates = Templates::new(Vec::new(), "https://example.com/");

        let html = templates
            .render(
                REDIRECT_TEMPLATE,
                &json!({"page": {"destination": "blog/post-1"}}),
            )
            .unwrap();

        assert!(html.contains(r#"<link rel="canonical" href="https://example.com/blog/post-1/"/>"#));
        assert!(html.contains("0;url=https://example.com/blog/post-1/"));
    }

    #[test]
    fn test_redirect_can_be_overridden() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "redirect.html", "go {{ page.destination }}");

        let templates = Templates::new(vec![dir.path().to_path_buf()], "/");

        let html = templates
            .render(REDIRECT_TEMPLATE, &json!({"page": {"destination": "a"}}))
            .unwrap();
        assert_eq!(html, "go a");
    }

    #[test]
    fn test_missing_template() {
        let templates = Templates::new(Vec::new(), "/");

        let err = templates.render("page.html", &json!({})).unwrap_err();

        assert!(matches!(err, TemplateError::NotFound(ref name) if name == "page.html"));
    }

    #[test]
    fn test_syntax_error_reports_template() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.html", "{% if %}");

        let templates = Templates::new(vec![dir.path().to_path_buf()], "/");
        let err = templates.render("broken.html", &json!({})).unwrap_err();

        assert!(matches!(err, TemplateError::Render { .. }));
        assert!(err.to_string().contains("broken.html"));
    }

    #[test]
    fn test_loader_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "page.html", "x");
        let nested = dir.path().join("layouts");
        fs::create_dir(&nested).unwrap();

        let templates = Templates::new(vec![nested], "/");

        let err = templates.render("../page.html", &json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
    }

    #[test]
    fn test_filters_available() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "list.html",
            "{{ page.body|excerpt(5) }}|{{ page.tag|urlize }}|{{ page.date|date(\"%Y\") }}|{{ page.path|url }}",
        );

        let templates = Templates::new(vec![dir.path().to_path_buf()], "https://x.org");
        let html = templates
            .render(
                "list.html",
                &json!({"page": {
                    "body": "<p>Hello world</p>",
                    "tag": "Rust Lang",
                    "date": "2024-03-01T00:00:00",
                    "path": "tags/rust"
                }}),
            )
            .unwrap();

        assert_eq!(html, "Hello…|rust-lang|2024|https://x.org/tags/rust/");
    }
}
