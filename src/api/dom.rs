//! DOM-backed notation surface
//!
//! Mirrors every class change into both the page index and the live SVG, so
//! lookups never have to query the document.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlElement, HtmlInputElement, MouseEvent, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition,
};

use crate::config::{DomIds, FollowSettings};
use crate::error::ViewerError;
use crate::models::Viewport;
use crate::notation::{ElementIndex, NotationSurface};
use crate::view::ClickEvent;

/// Marks a panel whose delegated click listener is installed
const LISTENING_ATTR: &str = "data-viewer-listening";

pub struct DomSurface<'a> {
    index: &'a mut ElementIndex,
    document: Document,
    dom: &'a DomIds,
    default_zoom: u32,
}

impl<'a> DomSurface<'a> {
    pub fn new(index: &'a mut ElementIndex, document: Document, dom: &'a DomIds, default_zoom: u32) -> Self {
        Self { index, document, dom, default_zoom }
    }

    fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn panel(&self) -> Option<Element> {
        self.by_id(&self.dom.panel)
    }
}

/// Elements under `root` matching `selector`
fn select_all(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(nodes) = root.query_selector_all(selector) else {
        log::warn!("Invalid selector: {}", selector);
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn toggle(element: &Element, class: &str, enabled: bool) {
    if let Err(e) = element.class_list().toggle_with_force(class, enabled) {
        log::warn!("Could not toggle class {}: {:?}", class, e);
    }
}

/// Current state of the three follow checkboxes (missing ones read as off)
pub fn read_follow_settings(document: &Document, dom: &DomIds) -> FollowSettings {
    let checked = |id: &str| {
        document
            .get_element_by_id(id)
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.checked())
            .unwrap_or(false)
    };
    FollowSettings {
        highlight: checked(&dom.highlight_checkbox),
        page_follow: checked(&dom.page_follow_checkbox),
        scroll_follow: checked(&dom.scroll_follow_checkbox),
    }
}

impl NotationSurface for DomSurface<'_> {
    fn index(&self) -> &ElementIndex {
        self.index
    }

    fn load_page(&mut self, svg: &str) -> Result<(), ViewerError> {
        *self.index = ElementIndex::from_svg(svg)?;
        match self.panel() {
            Some(panel) => panel.set_inner_html(svg),
            None => log::warn!("Notation panel #{} not found", self.dom.panel),
        }
        Ok(())
    }

    fn add_class(&mut self, id: &str, class: &str) {
        self.index.add_class(id, class);
        if let Some(element) = self.by_id(id) {
            toggle(&element, class, true);
        }
    }

    fn remove_class(&mut self, id: &str, class: &str) {
        self.index.remove_class(id, class);
        if let Some(element) = self.by_id(id) {
            toggle(&element, class, false);
        }
    }

    fn add_class_deep(&mut self, id: &str, class: &str) {
        self.index.add_class_deep(id, class);
        if let Some(element) = self.by_id(id) {
            toggle(&element, class, true);
            for group in select_all(&element, "g") {
                toggle(&group, class, true);
            }
        }
    }

    fn remove_class_deep(&mut self, id: &str, class: &str) {
        self.index.remove_class_deep(id, class);
        if let Some(element) = self.by_id(id) {
            toggle(&element, class, false);
            for child in select_all(&element, "*") {
                toggle(&child, class, false);
            }
        }
    }

    fn remove_class_everywhere(&mut self, class: &str) {
        self.index.remove_class_everywhere(class);
        if let Some(panel) = self.panel() {
            for element in select_all(&panel, &format!(".{}", class)) {
                toggle(&element, class, false);
            }
        }
    }

    fn set_class_on_groups(&mut self, class: &str, enabled: bool) {
        self.index.set_class_on_groups(class, enabled);
        if let Some(panel) = self.panel() {
            for group in select_all(&panel, "g") {
                toggle(&group, class, enabled);
            }
        }
    }

    fn set_panel_class(&mut self, class: &str, enabled: bool) {
        if let Some(panel) = self.panel() {
            toggle(&panel, class, enabled);
        }
    }

    fn set_page_label(&mut self, label: &str) {
        if let Some(element) = self.by_id(&self.dom.page_label) {
            element.set_text_content(Some(label));
        }
    }

    fn set_custom_style(&mut self, css: &str) {
        if let Some(style) = self.by_id(&self.dom.custom_style) {
            style.set_text_content(Some(css));
            return;
        }
        let created = self.document.create_element("style").and_then(|style| {
            style.set_id(&self.dom.custom_style);
            style.set_text_content(Some(css));
            match self.document.head() {
                Some(head) => head.append_child(&style).map(|_| ()),
                None => Err(JsValue::from_str("document has no head")),
            }
        });
        if let Err(e) = created {
            log::warn!("Could not create style element: {:?}", e);
        }
    }

    fn scroll_to(&mut self, id: &str) {
        if let Some(element) = self.by_id(id) {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Center);
            element.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }

    fn viewport(&self) -> Viewport {
        let zoom = self
            .by_id(&self.dom.zoom_control)
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
            .and_then(|input| input.value().trim().parse::<u32>().ok())
            .filter(|zoom| *zoom > 0)
            .unwrap_or(self.default_zoom);
        match self.panel() {
            Some(panel) => Viewport {
                width: panel.client_width() as f64,
                height: panel.client_height() as f64,
                zoom,
            },
            None => Viewport { zoom, ..Viewport::default() },
        }
    }

    /// One delegated `mouseup` listener on the panel; it survives page swaps
    fn attach_click_listeners(&mut self) {
        let Some(panel) = self.panel() else {
            return;
        };
        if panel.has_attribute(LISTENING_ATTR) {
            return;
        }

        let handler = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            // innermost group with an id, as if the group itself had the listener
            let Ok(Some(group)) = target.closest("g[id]") else {
                return;
            };
            event.stop_immediate_propagation();
            let click = ClickEvent {
                target_id: group.id(),
                alt_key: event.alt_key(),
                ctrl_key: event.ctrl_key(),
                meta_key: event.meta_key(),
            };
            super::core::dispatch_click(click);
        });

        if let Err(e) = panel.add_event_listener_with_callback("mouseup", handler.as_ref().unchecked_ref()) {
            log::warn!("Could not attach click listener: {:?}", e);
            return;
        }
        handler.forget();
        if let Err(e) = panel.set_attribute(LISTENING_ATTR, "true") {
            log::warn!("Could not mark notation panel: {:?}", e);
        }
    }

    fn focus_panel(&mut self) {
        if let Some(panel) = self.panel().and_then(|p| p.dyn_into::<HtmlElement>().ok()) {
            if let Err(e) = panel.focus() {
                log::debug!("Could not focus notation panel: {:?}", e);
            }
        }
    }
}
