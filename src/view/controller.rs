//! View controller
//!
//! Owns pagination, selection and the notation options, forwards render
//! requests to the engine and maps clicks on the notation to positions in
//! the encoding buffer.

use crate::config::{ModifierConvention, ViewerConfig};
use crate::engine::{self, EngineRequest};
use crate::error::{SpeedModeError, ViewerError};
use crate::models::{PageTarget, Pagination, RenderOptions, SelectionSet};
use crate::notation::classes::{CHORD, HIGHLIGHTED, INVERTED, MEASURE, NOTE, TUPLET, TUPLET_NUM};
use crate::notation::NotationSurface;
use crate::session::Host;

use super::click::ClickEvent;
use super::style;

#[derive(Debug, Clone)]
pub struct ViewController {
    pagination: Pagination,
    selection: SelectionSet,
    /// Note the cursor was last placed on; anchors page-start placement
    last_note_id: Option<String>,
    night_mode: bool,
    speed_mode: bool,
    options: RenderOptions,
    break_elements: Vec<String>,
    min_page_dimension: u32,
    panel_id: String,
    modifiers: ModifierConvention,
}

impl ViewController {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            pagination: Pagination::default(),
            selection: SelectionSet::default(),
            last_note_id: None,
            night_mode: false,
            speed_mode: config.speed_mode,
            options: RenderOptions::default(),
            break_elements: config.break_elements.clone(),
            min_page_dimension: config.min_page_dimension,
            panel_id: config.dom.panel.clone(),
            modifiers: config.modifier_convention.resolve(""),
        }
    }

    /// Use an already resolved modifier convention (the browser decides `Auto`)
    pub fn with_modifiers(mut self, modifiers: ModifierConvention) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn last_note_id(&self) -> Option<&str> {
        self.last_note_id.as_deref()
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn night_mode(&self) -> bool {
        self.night_mode
    }

    pub fn speed_mode(&self) -> bool {
        self.speed_mode
    }

    pub fn set_speed_mode(&mut self, enabled: bool) {
        self.speed_mode = enabled;
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Change options, load new data, optionally move the cursor to the page
    /// start, rewire listeners and reapply colors and highlight.
    pub fn apply_options_and_render(
        &mut self,
        contents: &str,
        options: Option<RenderOptions>,
        reset_cursor: bool,
        host: &mut Host<'_>,
    ) {
        self.set_render_options(options, true, host);
        let data = if self.speed_mode {
            self.current_page_encoding(contents)
        } else {
            contents.to_string()
        };
        host.engine.post(EngineRequest::LoadData { msg: data });

        if reset_cursor {
            self.set_cursor_to_page_start(host);
        }
        host.surface.attach_click_listeners();
        self.apply_notation_colors(host.surface);
        self.update_highlight(host);
    }

    /// Fit the options to the viewport and send them to the engine
    pub fn set_render_options(
        &mut self,
        options: Option<RenderOptions>,
        load_data: bool,
        host: &mut Host<'_>,
    ) {
        if let Some(options) = options {
            self.options = options;
        }
        self.options.fit_to(host.surface.viewport(), self.min_page_dimension);
        host.engine.post(EngineRequest::SetOptions { msg: self.options.clone(), load_data });
    }

    /// Speed mode input: the current page cut out of the encoding
    ///
    /// Falls back to the whole encoding when it cannot be split.
    fn current_page_encoding(&mut self, contents: &str) -> String {
        let mut attempt = engine::extract_page(contents, self.pagination.current(), &self.break_elements);
        if let Err(SpeedModeError::PageOutOfRange { page_count, .. }) = attempt {
            // the edit removed pages; pull the current page back into range
            self.pagination.set_count(page_count);
            attempt = engine::extract_page(contents, self.pagination.current(), &self.break_elements);
        }
        match attempt {
            Ok(page) => {
                self.pagination.set_count(page.page_count);
                page.encoding
            }
            Err(e) => {
                log::warn!("Speed mode extraction failed, loading full encoding: {}", e);
                contents.to_string()
            }
        }
    }

    /// Engine finished loading data
    pub fn on_data_loaded(&mut self, page_count: u32, host: &mut Host<'_>) {
        // in speed mode the engine only ever sees one page
        if !self.speed_mode {
            self.pagination.set_count(page_count);
        }
        self.show_page(None, host);
    }

    /// Request a page from the engine; invalid pages fall back to page 1
    pub fn show_page(&mut self, page: Option<u32>, host: &mut Host<'_>) {
        if self.pagination.is_empty() {
            return;
        }
        let requested = page.unwrap_or(self.pagination.current());
        let page = self.pagination.clamp_or_first(requested);
        log::info!("showPage(): {} of {}", page, self.pagination.count());

        let engine_page = if self.speed_mode { 1 } else { page };
        host.engine.post(EngineRequest::GetPage { msg: engine_page });
        self.update_page_label(host.surface);
    }

    /// Move to another page; returns the new page when something changed
    pub fn change_page(&mut self, target: PageTarget, surface: &mut dyn NotationSurface) -> Option<u32> {
        let page = self.pagination.change(target)?;
        self.update_page_label(surface);
        Some(page)
    }

    fn update_page_label(&self, surface: &mut dyn NotationSurface) {
        surface.set_page_label(&self.pagination.label());
    }

    /// Map a click on the notation to a selection and a cursor position
    pub fn handle_click(&mut self, click: &ClickEvent, host: &mut Host<'_>) -> String {
        let mut item = click.target_id.clone();
        // take the chord rather than the note when Alt is held
        if click.alt_key {
            if let Some(chord) = host.surface.closest_with_class(&click.target_id, CHORD) {
                item = chord;
            }
        }
        if host.surface.has_class(&click.target_id, TUPLET_NUM) {
            if let Some(tuplet) = host.surface.closest_with_class(&click.target_id, TUPLET) {
                item = tuplet;
            }
        }

        if click.extends_selection(self.modifiers) {
            self.selection.append(item.clone());
            log::info!("handleClick() added: {}, size now: {}", item, self.selection.len());
        } else {
            if let Some(range) = host.editor.locate_id(&item) {
                host.editor.set_cursor(range.start);
            }
            self.selection.replace(item.clone());
            log::info!("handleClick() newly created: {}", item);
        }
        self.update_highlight(host);
        host.surface.focus_panel();

        // control events point at their note through @startid
        let start_id = host
            .editor
            .attribute_by_id(&item, "startid")
            .map(|s| s.trim_start_matches('#').to_string())
            .filter(|s| !s.is_empty());
        self.last_note_id = Some(start_id.unwrap_or_else(|| item.clone()));
        item
    }

    /// Put the text cursor on the first element of the page, in the staff and
    /// layer of the last note the cursor was on when possible
    pub fn set_cursor_to_page_start(&mut self, host: &mut Host<'_>) -> Option<String> {
        let first_note = host.surface.first_with_class(NOTE);
        let id = match self.last_note_id.clone() {
            Some(anchor) => self.page_start_in_context(&anchor, host).or(first_note),
            None => first_note,
        };
        let Some(id) = id else {
            log::warn!("No note on the page to place the cursor on");
            return None;
        };

        if let Some(range) = host.editor.locate_id(&id) {
            host.editor.set_cursor(range.start);
        }
        log::info!("setCursorToPageStart(): last note {:?}, new id {}", self.last_note_id, id);
        self.selection.set_first(id.clone());
        self.last_note_id = Some(id.clone());
        Some(id)
    }

    fn page_start_in_context(&self, anchor: &str, host: &Host<'_>) -> Option<String> {
        let range = host.editor.locate_id(anchor)?;
        let staff = host.editor.element_n_above(range.start.row, "staff");
        let layer = host.editor.element_n_above(range.start.row, "layer");
        let measure = host.surface.first_with_class(MEASURE)?;
        host.surface.first_in_measure(&measure, staff.as_deref(), layer.as_deref())
    }

    /// Mark the selection, or the element under the text cursor
    pub fn update_highlight(&self, host: &mut Host<'_>) {
        host.surface.remove_class_everywhere(HIGHLIGHTED);
        let ids: Vec<String> = if self.selection.is_empty() {
            host.editor.element_id_at_cursor().into_iter().collect()
        } else {
            self.selection.ids().to_vec()
        };
        for id in &ids {
            host.surface.add_class(id, HIGHLIGHTED);
        }
    }

    /// Apply the night-mode state to the page and the panel
    pub fn apply_notation_colors(&self, surface: &mut dyn NotationSurface) {
        surface.set_class_on_groups(INVERTED, self.night_mode);
        surface.set_panel_class(INVERTED, self.night_mode);
    }

    pub fn swap_notation_colors(&mut self, surface: &mut dyn NotationSurface) -> bool {
        self.night_mode = !self.night_mode;
        log::info!("swapNotationColors: {}", self.night_mode);
        self.apply_notation_colors(surface);
        self.night_mode
    }

    pub fn change_highlight_color(
        &self,
        color: &str,
        surface: &mut dyn NotationSurface,
    ) -> Result<(), ViewerError> {
        let css = style::highlight_css(&self.panel_id, color)?;
        surface.set_custom_style(&css);
        Ok(())
    }
}
