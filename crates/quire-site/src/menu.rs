//! Navigation menus.
//!
//! Menus are assembled in two phases: entries derived from page `menu`
//! metadata, then configuration overrides that add, replace or disable
//! entries. Within a menu, entries iterate by ascending weight; equal weights
//! keep insertion order.

use std::collections::BTreeMap;

use quire_config::MenuEntryConfig;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::Value;

use crate::collection::PageCollection;

/// Menu membership declared by a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuSpec {
    /// `menu: main` joins one menu with weight 0.
    Single(String),
    /// `menu: {main: {weight: 2}, footer: ~}` joins several menus.
    Multiple(Vec<(String, i64)>),
}

impl MenuSpec {
    /// Interpret a frontmatter `menu` value.
    ///
    /// Accepts a menu name, a list of names, or a mapping of name to
    /// `{weight}` (a bare integer or null also work as the weight). Returns
    /// `None` for any other shape.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) if !name.trim().is_empty() => {
                Some(Self::Single(name.trim().to_owned()))
            }
            Value::Array(names) => {
                let menus: Vec<_> = names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|name| (name.trim().to_owned(), 0))
                    .filter(|(name, _)| !name.is_empty())
                    .collect();
                (!menus.is_empty()).then_some(Self::Multiple(menus))
            }
            Value::Object(map) => {
                let menus: Vec<_> = map
                    .iter()
                    .map(|(name, spec)| (name.clone(), weight_of(spec)))
                    .collect();
                (!menus.is_empty()).then_some(Self::Multiple(menus))
            }
            _ => None,
        }
    }

    /// Menu names with weights.
    #[must_use]
    pub fn memberships(&self) -> Vec<(&str, i64)> {
        match self {
            Self::Single(name) => vec![(name.as_str(), 0)],
            Self::Multiple(menus) => menus.iter().map(|(n, w)| (n.as_str(), *w)).collect(),
        }
    }
}

fn weight_of(spec: &Value) -> i64 {
    match spec {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::Object(map) => map.get("weight").and_then(Value::as_i64).unwrap_or(0),
        _ => 0,
    }
}

/// A menu entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub id: String,
    pub name: String,
    pub url: String,
    pub weight: i64,
}

/// A named menu.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Menu {
    name: String,
    entries: Vec<Entry>,
}

impl Menu {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an entry; an entry with the same id is replaced in place.
    pub fn add(&mut self, entry: Entry) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Entry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries by ascending weight, stable on insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<&Entry> {
        let mut sorted: Vec<&Entry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.weight);
        sorted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Menu {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries())
    }
}

/// All menus of a site, in order of first appearance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Menus {
    menus: Vec<Menu>,
}

impl Menus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Menu> {
        self.menus.iter().find(|m| m.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Menu> {
        self.menus.iter_mut().find(|m| m.name == name)
    }

    /// Get a menu, creating it if needed.
    pub fn get_or_insert(&mut self, name: &str) -> &mut Menu {
        let pos = match self.menus.iter().position(|m| m.name == name) {
            Some(pos) => pos,
            None => {
                self.menus.push(Menu::new(name));
                self.menus.len() - 1
            }
        };
        &mut self.menus[pos]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Menu> {
        self.menus.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }
}

impl Serialize for Menus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.menus.len()))?;
        for menu in &self.menus {
            map.serialize_entry(&menu.name, menu)?;
        }
        map.end()
    }
}

/// Build menus from page metadata, then apply configuration overrides.
#[must_use]
pub fn assemble_menus(
    pages: &PageCollection,
    overrides: &BTreeMap<String, Vec<MenuEntryConfig>>,
) -> Menus {
    let mut menus = Menus::new();

    for page in pages {
        let Some(spec) = &page.menu else {
            continue;
        };
        for (name, weight) in spec.memberships() {
            menus.get_or_insert(name).add(Entry {
                id: page.id.clone(),
                name: page.title.clone(),
                url: page.permalink().to_owned(),
                weight,
            });
        }
    }

    for (name, specs) in overrides {
        for spec in specs {
            if spec.disabled {
                if let Some(menu) = menus.get_mut(name) {
                    menu.remove(&spec.id);
                }
                continue;
            }
            let page = pages.get(&spec.id);
            let entry = Entry {
                id: spec.id.clone(),
                name: spec
                    .name
                    .clone()
                    .or_else(|| page.map(|p| p.title.clone()))
                    .unwrap_or_else(|| spec.id.clone()),
                url: spec
                    .url
                    .clone()
                    .or_else(|| page.map(|p| p.permalink().to_owned()))
                    .unwrap_or_else(|| spec.id.clone()),
                weight: spec.weight,
            };
            menus.get_or_insert(name).add(entry);
        }
    }

    tracing::debug!(menus = menus.menus.len(), "Assembled menus");
    menus
}
