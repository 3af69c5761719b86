//! Selected element identifiers

use serde::{Deserialize, Serialize};

/// Ordered set of selected element ids, in click order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct SelectionSet {
    ids: Vec<String>,
}

impl SelectionSet {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn first(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }

    /// Replace the whole selection with a single id
    pub fn replace(&mut self, id: impl Into<String>) {
        self.ids.clear();
        self.ids.push(id.into());
    }

    /// Add an id, keeping the earlier entries
    pub fn append(&mut self, id: impl Into<String>) {
        self.ids.push(id.into());
    }

    /// Overwrite the first entry (or add it when empty)
    pub fn set_first(&mut self, id: impl Into<String>) {
        match self.ids.first_mut() {
            Some(first) => *first = id.into(),
            None => self.ids.push(id.into()),
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
