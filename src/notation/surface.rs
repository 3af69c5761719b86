//! The rendered-notation seam
//!
//! `NotationSurface` is everything the viewer does to the rendered score and
//! the chrome around it. Lookups are answered by the page's [`ElementIndex`];
//! implementors only supply the index and the mutations.

use crate::error::ViewerError;
use crate::models::Viewport;

use super::index::ElementIndex;

pub trait NotationSurface {
    /// Index of the page currently shown
    fn index(&self) -> &ElementIndex;

    /// Replace the shown page with freshly rendered SVG
    fn load_page(&mut self, svg: &str) -> Result<(), ViewerError>;

    fn add_class(&mut self, id: &str, class: &str);

    fn remove_class(&mut self, id: &str, class: &str);

    /// Add `class` to the element and all its descendant groups
    fn add_class_deep(&mut self, id: &str, class: &str);

    /// Remove `class` from the element and all its descendants
    fn remove_class_deep(&mut self, id: &str, class: &str);

    fn remove_class_everywhere(&mut self, class: &str);

    /// Toggle `class` on every group of the page
    fn set_class_on_groups(&mut self, class: &str, enabled: bool);

    /// Toggle `class` on the notation panel itself
    fn set_panel_class(&mut self, class: &str, enabled: bool);

    fn set_page_label(&mut self, label: &str);

    /// Replace the contents of the custom style element
    fn set_custom_style(&mut self, css: &str);

    /// Scroll the panel so the element is visible
    fn scroll_to(&mut self, id: &str);

    /// Container size and zoom control value
    fn viewport(&self) -> Viewport;

    /// (Re)attach click handlers to the page's elements
    fn attach_click_listeners(&mut self);

    fn focus_panel(&mut self);

    fn contains(&self, id: &str) -> bool {
        self.index().contains(id)
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.index().has_class(id, class)
    }

    fn first_with_class(&self, class: &str) -> Option<String> {
        self.index().first_with_class(class)
    }

    fn ids_with_classes(&self, all: &[&str]) -> Vec<String> {
        self.index().ids_with_classes(all)
    }

    fn closest_with_class(&self, id: &str, class: &str) -> Option<String> {
        self.index().closest_with_class(id, class)
    }

    fn first_in_measure(
        &self,
        measure_id: &str,
        staff_n: Option<&str>,
        layer_n: Option<&str>,
    ) -> Option<String> {
        self.index().first_in_measure(measure_id, staff_n, layer_n)
    }
}
