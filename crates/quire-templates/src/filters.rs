//! Filters and functions registered on the template environment.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use minijinja::{Error, ErrorKind};
use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Default excerpt length in characters.
const EXCERPT_LENGTH: usize = 450;
/// Default excerpt suffix.
const EXCERPT_SUFFIX: &str = "…";
/// Default date format.
const DATE_FORMAT: &str = "%B %-d, %Y";

/// Build an absolute URL for a site path.
///
/// Absolute URLs pass through. Extension-less paths get a trailing slash since
/// they are written as `<path>/index.html`.
pub(crate) fn url(baseurl: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//") {
        return path.to_owned();
    }

    let base = baseurl.trim_end_matches('/');
    let path = path.trim_matches('/');
    if path.is_empty() {
        return format!("{base}/");
    }

    let has_extension = path
        .rsplit('/')
        .next()
        .is_some_and(|last| last.contains('.'));
    if has_extension {
        format!("{base}/{path}")
    } else {
        format!("{base}/{path}/")
    }
}

/// Strip tags and truncate to `length` characters, appending `suffix` when cut.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn excerpt(value: String, length: Option<usize>, suffix: Option<String>) -> String {
    let length = length.unwrap_or(EXCERPT_LENGTH);
    let text = TAG_RE.replace_all(&value, "");
    let text = text.trim();

    if text.chars().count() <= length {
        return text.to_owned();
    }

    let mut out: String = text.chars().take(length).collect();
    out.push_str(suffix.as_deref().unwrap_or(EXCERPT_SUFFIX));
    out
}

/// Slug filter.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn urlize(value: String) -> String {
    quire_renderer::urlize(&value)
}

/// Format a serialized page date (`2024-03-01T10:00:00` or `2024-03-01`).
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn date(value: String, format: Option<String>) -> Result<String, Error> {
    let format = format.as_deref().unwrap_or(DATE_FORMAT);
    let parsed = NaiveDateTime::parse_from_str(&value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| {
            NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        })
        .map_err(|e| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("cannot parse '{value}' as a date"),
            )
            .with_source(e)
        })?;
    Ok(parsed.format(format).to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_url_joins_base() {
        assert_eq!(url("https://example.com/", "blog/post-1"), "https://example.com/blog/post-1/");
        assert_eq!(url("https://example.com", "/about"), "https://example.com/about/");
    }

    #[test]
    fn test_url_root() {
        assert_eq!(url("https://example.com/", ""), "https://example.com/");
    }

    #[test]
    fn test_url_with_extension() {
        assert_eq!(url("https://example.com/", "feed.xml"), "https://example.com/feed.xml");
    }

    #[test]
    fn test_url_absolute_passthrough() {
        assert_eq!(url("https://example.com/", "https://other.org/x"), "https://other.org/x");
    }

    #[test]
    fn test_excerpt_short_text_unchanged() {
        assert_eq!(excerpt("<p>Short</p>".to_owned(), None, None), "Short");
    }

    #[test]
    fn test_excerpt_truncates_with_suffix() {
        let result = excerpt("<p>Hello <em>wide</em> world</p>".to_owned(), Some(10), None);
        assert_eq!(result, "Hello wide…");
    }

    #[test]
    fn test_excerpt_custom_suffix() {
        let result = excerpt("abcdef".to_owned(), Some(3), Some("...".to_owned()));
        assert_eq!(result, "abc...");
    }

    #[test]
    fn test_excerpt_counts_characters() {
        let result = excerpt("ééééé".to_owned(), Some(2), Some(String::new()));
        assert_eq!(result, "éé");
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(
            date("2024-03-01T10:30:00".to_owned(), None).unwrap(),
            "March 1, 2024"
        );
        assert_eq!(
            date("2024-03-01".to_owned(), Some("%d/%m/%Y".to_owned())).unwrap(),
            "01/03/2024"
        );
    }

    #[test]
    fn test_date_invalid() {
        assert!(date("yesterday".to_owned(), None).is_err());
    }

    #[test]
    fn test_urlize_filter() {
        assert_eq!(urlize("Rust Lang".to_owned()), "rust-lang");
    }
}
