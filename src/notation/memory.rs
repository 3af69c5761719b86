//! Headless notation surface
//!
//! Keeps the page index plus a record of the chrome updates. Used outside the
//! browser and by the tests.

use std::collections::BTreeSet;

use crate::error::ViewerError;
use crate::models::Viewport;

use super::index::ElementIndex;
use super::surface::NotationSurface;

#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    index: ElementIndex,
    pub viewport: Viewport,
    pub page_label: String,
    pub custom_style: String,
    pub panel_classes: BTreeSet<String>,
    pub scrolled_to: Vec<String>,
    pub listener_wirings: usize,
    pub focus_requests: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface already showing `svg`
    pub fn with_page(svg: &str) -> Result<Self, ViewerError> {
        let mut surface = Self::new();
        surface.load_page(svg)?;
        Ok(surface)
    }
}

impl NotationSurface for MemorySurface {
    fn index(&self) -> &ElementIndex {
        &self.index
    }

    fn load_page(&mut self, svg: &str) -> Result<(), ViewerError> {
        self.index = ElementIndex::from_svg(svg)?;
        Ok(())
    }

    fn add_class(&mut self, id: &str, class: &str) {
        self.index.add_class(id, class);
    }

    fn remove_class(&mut self, id: &str, class: &str) {
        self.index.remove_class(id, class);
    }

    fn add_class_deep(&mut self, id: &str, class: &str) {
        self.index.add_class_deep(id, class);
    }

    fn remove_class_deep(&mut self, id: &str, class: &str) {
        self.index.remove_class_deep(id, class);
    }

    fn remove_class_everywhere(&mut self, class: &str) {
        self.index.remove_class_everywhere(class);
    }

    fn set_class_on_groups(&mut self, class: &str, enabled: bool) {
        self.index.set_class_on_groups(class, enabled);
    }

    fn set_panel_class(&mut self, class: &str, enabled: bool) {
        if enabled {
            self.panel_classes.insert(class.to_string());
        } else {
            self.panel_classes.remove(class);
        }
    }

    fn set_page_label(&mut self, label: &str) {
        self.page_label = label.to_string();
    }

    fn set_custom_style(&mut self, css: &str) {
        self.custom_style = css.to_string();
    }

    fn scroll_to(&mut self, id: &str) {
        self.scrolled_to.push(id.to_string());
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn attach_click_listeners(&mut self) {
        self.listener_wirings += 1;
    }

    fn focus_panel(&mut self) {
        self.focus_requests += 1;
    }
}
