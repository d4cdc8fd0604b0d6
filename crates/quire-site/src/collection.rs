//! Ordered page collection keyed by page id.

use std::collections::HashMap;

use crate::page::Page;

/// Page collection error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CollectionError {
    /// A page with this id is already in the collection.
    #[error("Duplicate page id: {0}")]
    DuplicateId(String),
}

/// An ordered mapping from page id to [`Page`].
///
/// Iteration follows insertion order. `replace` keeps the replaced entry's
/// position, which is how converted pages take the place of raw ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageCollection {
    pages: Vec<Page>,
    index: HashMap<String, usize>,
}

impl PageCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page under its id.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateId`] if the id is already present.
    pub fn add(&mut self, page: Page) -> Result<(), CollectionError> {
        if self.index.contains_key(&page.id) {
            return Err(CollectionError::DuplicateId(page.id));
        }
        self.index.insert(page.id.clone(), self.pages.len());
        self.pages.push(page);
        Ok(())
    }

    /// Replace the page stored under `id`, keeping its position.
    ///
    /// Returns `false` and leaves the collection unchanged if `id` is absent
    /// or differs from `page.id`.
    pub fn replace(&mut self, id: &str, page: Page) -> bool {
        if page.id != id {
            return false;
        }
        match self.index.get(id) {
            Some(&pos) => {
                self.pages[pos] = page;
                true
            }
            None => false,
        }
    }

    /// Replace the page with the same id, or add it at the end.
    pub fn upsert(&mut self, page: Page) {
        if let Some(&pos) = self.index.get(&page.id) {
            self.pages[pos] = page;
        } else {
            self.index.insert(page.id.clone(), self.pages.len());
            self.pages.push(page);
        }
    }

    /// Upsert every page of `other`, in its order.
    pub fn merge(&mut self, other: PageCollection) {
        for page in other.pages {
            self.upsert(page);
        }
    }

    /// Remove and return the page stored under `id`.
    pub fn remove(&mut self, id: &str) -> Option<Page> {
        let pos = self.index.remove(id)?;
        let page = self.pages.remove(pos);
        for idx in self.index.values_mut() {
            if *idx > pos {
                *idx -= 1;
            }
        }
        Some(page)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Page> {
        self.index.get(id).map(|&pos| &self.pages[pos])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// New collection holding clones of the matching pages, in order.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&Page) -> bool) -> Self {
        let mut filtered = Self::new();
        for page in self.pages.iter().filter(|p| predicate(p)) {
            filtered.index.insert(page.id.clone(), filtered.pages.len());
            filtered.pages.push(page.clone());
        }
        filtered
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl<'a> IntoIterator for &'a PageCollection {
    type Item = &'a Page;
    type IntoIter = std::slice::Iter<'a, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

impl IntoIterator for PageCollection {
    type Item = Page;
    type IntoIter = std::vec::IntoIter<Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.into_iter()
    }
}
