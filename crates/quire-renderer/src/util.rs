//! Shared utility functions for markdown rendering.

/// Escape the five HTML-special characters.
///
/// # Examples
///
/// ```
/// use quire_renderer::escape_html;
///
/// assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Normalize a path into a URL-safe form.
///
/// Lower-cases, collapses every run of non-alphanumeric characters within a
/// segment into a single `-`, trims `-` from segment ends, and drops empty
/// segments.
///
/// # Examples
///
/// ```
/// use quire_renderer::urlize;
///
/// assert_eq!(urlize("Blog/My First Post!"), "blog/my-first-post");
/// assert_eq!(urlize("/tags/Rust Lang/"), "tags/rust-lang");
/// ```
#[must_use]
pub fn urlize(path: &str) -> String {
    path.split(['/', '\\'])
        .map(urlize_segment)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn urlize_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut pending_dash = false;
    for c in segment.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Resolve a markdown link URL relative to the directory of the linking page.
///
/// Transforms relative `.md` links to absolute site URLs:
/// - `./sibling.md` → `/base/sibling/`
/// - `../parent.md` → `/parent/`
/// - `sub/index.md` → `/base/sub/`
///
/// External links, fragment-only links, and non-markdown links are returned unchanged.
///
/// # Examples
///
/// ```
/// use quire_renderer::resolve_link;
///
/// assert_eq!(resolve_link("post-2.md", "blog"), "/blog/post-2/");
/// assert_eq!(resolve_link("../index.md#top", "blog"), "/#top");
/// ```
#[must_use]
#[allow(clippy::case_sensitive_file_extension_comparisons)]
pub fn resolve_link(url: &str, base_dir: &str) -> String {
    if url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("//")
        || url.starts_with("mailto:")
        || url.starts_with("tel:")
        || url.starts_with('#')
    {
        return url.to_owned();
    }

    if !url.ends_with(".md") && !url.contains(".md#") {
        return url.to_owned();
    }

    let (path_part, fragment) = match url.find('#') {
        Some(hash_pos) => (&url[..hash_pos], &url[hash_pos..]),
        None => (url, ""),
    };

    let resolved = if path_part.starts_with('/') {
        path_part.trim_start_matches('/').to_owned()
    } else {
        resolve_relative_path(path_part, base_dir)
    };

    let clean = resolved.strip_suffix(".md").unwrap_or(&resolved);
    let clean = if clean == "index" {
        ""
    } else {
        clean.strip_suffix("/index").unwrap_or(clean)
    };

    if clean.is_empty() {
        format!("/{fragment}")
    } else {
        format!("/{clean}/{fragment}")
    }
}

/// Resolve a relative path against a base directory.
///
/// `..` never climbs above the root.
fn resolve_relative_path(relative: &str, base: &str) -> String {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();

    for component in relative.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(component),
        }
    }

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_escape_html_plain() {
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_urlize_collapses_and_trims() {
        assert_eq!(urlize("  Hello,   World  "), "hello-world");
        assert_eq!(urlize("a--b__c"), "a-b-c");
    }

    #[test]
    fn test_urlize_keeps_segments() {
        assert_eq!(urlize("Blog//Post 1/"), "blog/post-1");
        assert_eq!(urlize("blog/page/2"), "blog/page/2");
    }

    #[test]
    fn test_urlize_empty() {
        assert_eq!(urlize(""), "");
        assert_eq!(urlize("/"), "");
        assert_eq!(urlize("!!!"), "");
    }

    #[test]
    fn test_urlize_unicode() {
        assert_eq!(urlize("Café Crème"), "café-crème");
    }

    #[test]
    fn test_resolve_link_sibling() {
        assert_eq!(resolve_link("./post-2.md", "blog"), "/blog/post-2/");
    }

    #[test]
    fn test_resolve_link_parent() {
        assert_eq!(resolve_link("../about.md", "blog/2024"), "/blog/about/");
    }

    #[test]
    fn test_resolve_link_section_index() {
        assert_eq!(resolve_link("archive/index.md", "blog"), "/blog/archive/");
    }

    #[test]
    fn test_resolve_link_root_index() {
        assert_eq!(resolve_link("index.md", ""), "/");
    }

    #[test]
    fn test_resolve_link_with_fragment() {
        assert_eq!(
            resolve_link("./page.md#section", "docs"),
            "/docs/page/#section"
        );
    }

    #[test]
    fn test_resolve_link_absolute() {
        assert_eq!(resolve_link("/about.md", "blog"), "/about/");
    }

    #[test]
    fn test_resolve_link_traversal_clamped() {
        assert_eq!(resolve_link("../../../etc/passwd.md", "a"), "/etc/passwd/");
    }

    #[test]
    fn test_resolve_link_unchanged() {
        assert_eq!(
            resolve_link("https://example.com/a.md", "blog"),
            "https://example.com/a.md"
        );
        assert_eq!(resolve_link("mailto:me@example.com", "blog"), "mailto:me@example.com");
        assert_eq!(resolve_link("#section", "blog"), "#section");
        assert_eq!(resolve_link("./image.png", "blog"), "./image.png");
    }
}
