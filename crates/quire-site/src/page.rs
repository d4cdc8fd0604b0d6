//! Page entity.
//!
//! A [`Page`] is either parsed from a content document or synthesized by a
//! generator (`is_virtual`). Pages are plain values: `clone()` yields a fully
//! independent copy, so generators derive variants without touching the source.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::menu::MenuSpec;

/// Structural role of a page. Drives layout fallback and generator eligibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Ordinary content page.
    #[default]
    Page,
    /// Site root.
    Homepage,
    /// Section index.
    Section,
    /// Listing of pages sharing one taxonomy term.
    Taxonomy,
    /// Listing of all terms of one taxonomy.
    Terms,
}

/// A site page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    /// Unique identifier within a collection.
    pub id: String,
    /// Source file stem (empty for virtual pages).
    pub name: String,
    /// URL-safe path without leading slash (`""` for the root).
    pub pathname: String,
    /// Display title.
    pub title: String,
    /// Owning content section.
    pub section: Option<String>,
    /// Explicit layout hint.
    pub layout: Option<String>,
    /// Publication date.
    pub date: Option<NaiveDateTime>,
    /// Structural role, fixed at creation.
    pub node_type: NodeType,
    /// Frontmatter-derived and generator-set metadata, in insertion order.
    pub variables: Map<String, Value>,
    /// Converted body.
    pub html: Option<String>,
    /// True for generator-synthesized pages.
    pub is_virtual: bool,
    /// Explicit output URL overriding `pathname`.
    pub permalink_override: Option<String>,
    /// Source document path relative to the content root.
    pub source_path: Option<PathBuf>,
    /// Raw frontmatter block.
    pub frontmatter: String,
    /// Raw body text.
    pub body: String,
    /// Menus this page joins.
    pub menu: Option<MenuSpec>,
}

impl Page {
    /// Create a page with the given id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Create a virtual page of the given type.
    #[must_use]
    pub fn virtual_page(
        id: impl Into<String>,
        pathname: impl Into<String>,
        node_type: NodeType,
    ) -> Self {
        Self {
            id: id.into(),
            pathname: pathname.into(),
            node_type,
            is_virtual: true,
            ..Self::default()
        }
    }

    /// Resolved output URL: the override if present, else the pathname.
    #[must_use]
    pub fn permalink(&self) -> &str {
        self.permalink_override.as_deref().unwrap_or(&self.pathname)
    }

    #[must_use]
    pub fn has_variable(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    #[must_use]
    pub fn variable(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    /// Set a variable, replacing any previous value in place.
    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Remove a variable, keeping the order of the others.
    pub fn unset_variable(&mut self, key: &str) -> Option<Value> {
        self.variables.shift_remove(key)
    }

    /// Lightweight reference used in page lists.
    #[must_use]
    pub fn to_ref(&self) -> PageRef {
        PageRef {
            id: self.id.clone(),
            title: self.title.clone(),
            permalink: self.permalink().to_owned(),
            section: self.section.clone(),
            date: self.date,
        }
    }

    /// Template-facing view of the page.
    ///
    /// Variables are exposed at the top level and under `variables`; the
    /// built-in fields take precedence on name clashes.
    #[must_use]
    pub fn to_context(&self) -> Value {
        let mut ctx = self.variables.clone();
        ctx.insert("variables".to_owned(), Value::Object(self.variables.clone()));
        ctx.insert("id".to_owned(), Value::from(self.id.as_str()));
        ctx.insert("name".to_owned(), Value::from(self.name.as_str()));
        ctx.insert("pathname".to_owned(), Value::from(self.pathname.as_str()));
        ctx.insert("permalink".to_owned(), Value::from(self.permalink()));
        ctx.insert("title".to_owned(), Value::from(self.title.as_str()));
        ctx.insert("section".to_owned(), self.section.clone().into());
        ctx.insert("layout".to_owned(), self.layout.clone().into());
        ctx.insert(
            "date".to_owned(),
            self.date.map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string()).into(),
        );
        ctx.insert(
            "type".to_owned(),
            serde_json::to_value(self.node_type).unwrap_or(Value::Null),
        );
        ctx.insert("content".to_owned(), self.html.clone().into());
        ctx.insert("virtual".to_owned(), Value::Bool(self.is_virtual));
        Value::Object(ctx)
    }
}

/// Reference to a page inside a list variable (`pages`, `pagination.pages`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub id: String,
    pub title: String,
    pub permalink: String,
    pub section: Option<String>,
    pub date: Option<NaiveDateTime>,
}

/// Build a `pages` variable value: references sorted by date, newest first.
///
/// Undated pages go last; ties keep input order.
pub(crate) fn pages_value<'a>(pages: impl IntoIterator<Item = &'a Page>) -> Value {
    let mut refs: Vec<PageRef> = pages.into_iter().map(Page::to_ref).collect();
    refs.sort_by(|a, b| match (a.date, b.date) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    serde_json::to_value(refs).unwrap_or_else(|_| Value::Array(Vec::new()))
}

/// Capitalize the first character (`blog` → `Blog`).
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
