//! Indexed view of a rendered page
//!
//! Each page SVG is parsed once into a pre-order arena. Subtrees are the
//! contiguous ranges `index..end`, so descendant walks are slices, and the
//! class index keeps per-class element lists in document order. Lookups that
//! would otherwise be DOM-wide selector scans (first note on the page, all
//! currently sounding notes, closest measure) go through here.

use std::collections::{BTreeSet, HashMap};

use crate::error::ViewerError;

use super::classes;

#[derive(Debug, Clone)]
struct IndexedElement {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    /// `data-n` of staff/layer groups
    n: Option<String>,
    parent: Option<usize>,
    /// One past the last descendant
    end: usize,
}

/// Arena of the elements of one rendered page
#[derive(Debug, Clone, Default)]
pub struct ElementIndex {
    nodes: Vec<IndexedElement>,
    by_id: HashMap<String, usize>,
    by_class: HashMap<String, BTreeSet<usize>>,
}

impl ElementIndex {
    /// Parse and index a page SVG
    pub fn from_svg(svg: &str) -> Result<Self, ViewerError> {
        let doc = roxmltree::Document::parse(svg).map_err(|e| ViewerError::PageSvg(e.to_string()))?;
        let mut index = Self::default();
        index.visit(doc.root_element(), None);
        log::debug!(
            "Indexed page: {} elements, {} with ids",
            index.nodes.len(),
            index.by_id.len()
        );
        Ok(index)
    }

    fn visit(&mut self, node: roxmltree::Node<'_, '_>, parent: Option<usize>) {
        let index = self.nodes.len();
        let id = node.attribute("id").map(str::to_string);
        let mut element_classes: Vec<String> = Vec::new();
        for class in node.attribute("class").unwrap_or("").split_whitespace() {
            if !element_classes.iter().any(|c| c == class) {
                element_classes.push(class.to_string());
            }
        }

        if let Some(id) = &id {
            self.by_id.entry(id.clone()).or_insert(index);
        }
        for class in &element_classes {
            self.by_class.entry(class.clone()).or_default().insert(index);
        }
        self.nodes.push(IndexedElement {
            tag: node.tag_name().name().to_string(),
            id,
            classes: element_classes,
            n: node.attribute("data-n").map(str::to_string),
            parent,
            end: index + 1,
        });

        for child in node.children().filter(|c| c.is_element()) {
            self.visit(child, Some(index));
        }
        self.nodes[index].end = self.nodes.len();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    fn node_has_class(&self, index: usize, class: &str) -> bool {
        self.nodes[index].classes.iter().any(|c| c == class)
    }

    fn descendants(&self, index: usize) -> std::ops::Range<usize> {
        index + 1..self.nodes[index].end
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.position(id).is_some_and(|i| self.node_has_class(i, class))
    }

    /// Ids of elements carrying `class`, in document order
    pub fn ids_with_class(&self, class: &str) -> Vec<String> {
        self.by_class
            .get(class)
            .into_iter()
            .flatten()
            .filter_map(|&i| self.nodes[i].id.clone())
            .collect()
    }

    /// Ids of elements carrying every class in `all`, in document order
    pub fn ids_with_classes(&self, all: &[&str]) -> Vec<String> {
        let Some((first, rest)) = all.split_first() else {
            return Vec::new();
        };
        self.by_class
            .get(*first)
            .into_iter()
            .flatten()
            .filter(|&&i| rest.iter().all(|c| self.node_has_class(i, c)))
            .filter_map(|&i| self.nodes[i].id.clone())
            .collect()
    }

    pub fn first_with_class(&self, class: &str) -> Option<String> {
        self.by_class
            .get(class)?
            .iter()
            .find_map(|&i| self.nodes[i].id.clone())
    }

    /// The element itself or its nearest ancestor carrying `class`
    pub fn closest_with_class(&self, id: &str, class: &str) -> Option<String> {
        let mut current = self.position(id);
        while let Some(i) = current {
            if self.node_has_class(i, class) {
                if let Some(found) = &self.nodes[i].id {
                    return Some(found.clone());
                }
            }
            current = self.nodes[i].parent;
        }
        None
    }

    fn first_descendant(&self, scope: usize, matches: impl Fn(usize) -> bool) -> Option<usize> {
        self.descendants(scope).find(|&i| matches(i))
    }

    fn group_with_n(&self, scope: usize, class: &str, n: Option<&str>) -> Option<usize> {
        match n {
            Some(n) => self.first_descendant(scope, |i| {
                self.node_has_class(i, class) && self.nodes[i].n.as_deref() == Some(n)
            }),
            None => Some(scope),
        }
    }

    /// First navigable element in a measure, narrowed to staff/layer `@n` when given
    pub fn first_in_measure(
        &self,
        measure_id: &str,
        staff_n: Option<&str>,
        layer_n: Option<&str>,
    ) -> Option<String> {
        let measure = self.position(measure_id)?;
        let staff = self.group_with_n(measure, classes::STAFF, staff_n)?;
        let layer = self.group_with_n(staff, classes::LAYER, layer_n)?;
        let found = self.first_descendant(layer, |i| {
            self.nodes[i].id.is_some()
                && classes::NAVIGABLE.iter().any(|c| self.node_has_class(i, c))
        })?;
        self.nodes[found].id.clone()
    }

    fn add_to(&mut self, index: usize, class: &str) {
        if self.node_has_class(index, class) {
            return;
        }
        self.nodes[index].classes.push(class.to_string());
        self.by_class.entry(class.to_string()).or_default().insert(index);
    }

    fn remove_from(&mut self, index: usize, class: &str) {
        self.nodes[index].classes.retain(|c| c != class);
        if let Some(set) = self.by_class.get_mut(class) {
            set.remove(&index);
        }
    }

    pub fn add_class(&mut self, id: &str, class: &str) {
        if let Some(i) = self.position(id) {
            self.add_to(i, class);
        }
    }

    pub fn remove_class(&mut self, id: &str, class: &str) {
        if let Some(i) = self.position(id) {
            self.remove_from(i, class);
        }
    }

    /// Add `class` to the element and every descendant group
    pub fn add_class_deep(&mut self, id: &str, class: &str) {
        let Some(i) = self.position(id) else { return };
        self.add_to(i, class);
        for d in self.descendants(i) {
            if self.nodes[d].tag == "g" {
                self.add_to(d, class);
            }
        }
    }

    /// Remove `class` from the element and all of its descendants
    pub fn remove_class_deep(&mut self, id: &str, class: &str) {
        let Some(i) = self.position(id) else { return };
        self.remove_from(i, class);
        for d in self.descendants(i) {
            self.remove_from(d, class);
        }
    }

    pub fn remove_class_everywhere(&mut self, class: &str) {
        if let Some(set) = self.by_class.remove(class) {
            for i in set {
                self.nodes[i].classes.retain(|c| c != class);
            }
        }
    }

    /// Toggle `class` on every `<g>` of the page
    pub fn set_class_on_groups(&mut self, class: &str, enabled: bool) {
        for i in 0..self.nodes.len() {
            if self.nodes[i].tag != "g" {
                continue;
            }
            if enabled {
                self.add_to(i, class);
            } else {
                self.remove_from(i, class);
            }
        }
    }

    /// Number of elements (with or without id) carrying `class`
    pub fn count_with_class(&self, class: &str) -> usize {
        self.by_class.get(class).map_or(0, BTreeSet::len)
    }
}
