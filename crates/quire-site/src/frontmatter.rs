//! Frontmatter splitting and conversion.
//!
//! A document may open with a metadata block delimited by `---` lines (or the
//! HTML-comment form `<!---` … `--->`). The block is converted to a mapping in
//! the configured [`FrontmatterFormat`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use quire_config::FrontmatterFormat;
use serde_json::{Map, Value};

/// Frontmatter conversion error.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The block is not valid in the configured format.
    #[error("Invalid {format} frontmatter: {message}")]
    Parse {
        format: FrontmatterFormat,
        message: String,
    },
    /// The block parsed to something other than a mapping.
    #[error("Frontmatter must be a mapping, got {0}")]
    NotAMapping(&'static str),
}

/// Split raw document text into `(frontmatter, body)`.
///
/// Without an opening delimiter on the first line, or without a closing one,
/// the frontmatter is empty and the whole text is the body.
#[must_use]
pub fn split(raw: &str) -> (&str, &str) {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let Some((first, rest)) = split_line(raw) else {
        return ("", raw);
    };
    let close = match first.trim_end() {
        "---" => "---",
        "<!---" => "--->",
        _ => return ("", raw),
    };

    let mut offset = 0;
    let mut remaining = rest;
    while let Some((line, after)) = split_line(remaining) {
        if line.trim_end() == close {
            return (&rest[..offset], after);
        }
        offset += remaining.len() - after.len();
        remaining = after;
    }
    ("", raw)
}

/// Split off the first line, returning `(line, rest)`.
///
/// The line excludes its terminator; a final line without a terminator is
/// returned with an empty rest. Returns `None` for empty input.
fn split_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    match text.find('\n') {
        Some(pos) => {
            let line = &text[..pos];
            Some((line.strip_suffix('\r').unwrap_or(line), &text[pos + 1..]))
        }
        None => Some((text, "")),
    }
}

/// Convert a raw frontmatter block to a mapping.
///
/// An empty or blank block yields an empty mapping.
///
/// # Errors
///
/// Returns [`ConversionError`] if the block does not parse or is not a mapping.
pub fn convert(raw: &str, format: FrontmatterFormat) -> Result<Map<String, Value>, ConversionError> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }

    let parse_error = |message: String| ConversionError::Parse { format, message };
    let value = match format {
        FrontmatterFormat::Yaml => {
            serde_yaml::from_str::<Value>(raw).map_err(|e| parse_error(e.to_string()))?
        }
        FrontmatterFormat::Json => {
            serde_json::from_str::<Value>(raw).map_err(|e| parse_error(e.to_string()))?
        }
        FrontmatterFormat::Toml => {
            let table: toml::Table =
                toml::from_str(raw).map_err(|e| parse_error(e.to_string()))?;
            toml_to_json(toml::Value::Table(table))
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        Value::Array(_) => Err(ConversionError::NotAMapping("a sequence")),
        Value::String(_) => Err(ConversionError::NotAMapping("a string")),
        Value::Number(_) => Err(ConversionError::NotAMapping("a number")),
        Value::Bool(_) => Err(ConversionError::NotAMapping("a boolean")),
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Interpret a `date` value.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM:SS`, RFC 3339
/// (converted to its local wall time) and unix timestamps.
#[must_use]
pub fn parse_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc()),
        Value::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_split_with_frontmatter() {
        let (fm, body) = split("---\ntitle: Hello\n---\nBody text\n");

        assert_eq!(fm, "title: Hello\n");
        assert_eq!(body, "Body text\n");
    }

    #[test]
    fn test_split_comment_form() {
        let (fm, body) = split("<!---\ntitle: Hi\n--->\n# Body");

        assert_eq!(fm, "title: Hi\n");
        assert_eq!(body, "# Body");
    }

    #[test]
    fn test_split_crlf() {
        let (fm, body) = split("---\r\ntitle: A\r\n---\r\nBody");

        assert_eq!(fm, "title: A\r\n");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_split_without_frontmatter() {
        assert_eq!(split("# Just body\n"), ("", "# Just body\n"));
        assert_eq!(split(""), ("", ""));
    }

    #[test]
    fn test_split_unclosed_block() {
        let raw = "---\ntitle: A\nno end";

        assert_eq!(split(raw), ("", raw));
    }

    #[test]
    fn test_split_empty_block() {
        assert_eq!(split("---\n---\nBody"), ("", "Body"));
    }

    #[test]
    fn test_convert_yaml() {
        let map = convert("title: Hello\ntags: [a, b]\n", FrontmatterFormat::Yaml).unwrap();

        assert_eq!(Value::Object(map), json!({"title": "Hello", "tags": ["a", "b"]}));
    }

    #[test]
    fn test_convert_toml() {
        let map = convert(
            "title = \"Hello\"\ndate = 2024-03-01\n[menu.main]\nweight = 2\n",
            FrontmatterFormat::Toml,
        )
        .unwrap();

        assert_eq!(
            Value::Object(map),
            json!({"title": "Hello", "date": "2024-03-01", "menu": {"main": {"weight": 2}}})
        );
    }

    #[test]
    fn test_convert_json() {
        let map = convert(r#"{"title": "Hello"}"#, FrontmatterFormat::Json).unwrap();

        assert_eq!(map.get("title"), Some(&json!("Hello")));
    }

    #[test]
    fn test_convert_blank_is_empty() {
        assert!(convert("  \n", FrontmatterFormat::Yaml).unwrap().is_empty());
    }

    #[test]
    fn test_convert_malformed_yaml() {
        let err = convert("title: [unclosed\n", FrontmatterFormat::Yaml).unwrap_err();

        assert!(matches!(err, ConversionError::Parse { format: FrontmatterFormat::Yaml, .. }));
        assert!(err.to_string().starts_with("Invalid yaml frontmatter"));
    }

    #[test]
    fn test_convert_not_a_mapping() {
        let err = convert("- a\n- b\n", FrontmatterFormat::Yaml).unwrap_err();

        assert!(matches!(err, ConversionError::NotAMapping("a sequence")));
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date(&json!("2024-03-01")), Some(ymd_hms(2024, 3, 1, 0, 0, 0)));
        assert_eq!(
            parse_date(&json!("2024-03-01 10:30")),
            Some(ymd_hms(2024, 3, 1, 10, 30, 0))
        );
        assert_eq!(
            parse_date(&json!("2024-03-01T10:30:15")),
            Some(ymd_hms(2024, 3, 1, 10, 30, 15))
        );
        assert_eq!(
            parse_date(&json!("2024-03-01T10:30:15+02:00")),
            Some(ymd_hms(2024, 3, 1, 10, 30, 15))
        );
        assert_eq!(parse_date(&json!(0)), Some(ymd_hms(1970, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_parse_date_invalid() {
        assert_eq!(parse_date(&json!("soon")), None);
        assert_eq!(parse_date(&json!(true)), None);
    }
}
