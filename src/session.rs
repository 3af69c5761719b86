//! Viewer session
//!
//! The single owner of all mutable viewer state. Hosts feed it events
//! (engine answers, fired timers, player notes, clicks, edits) together with
//! a [`Host`] giving access to the outside world for the duration of the call.

use crate::config::{FollowSettings, ViewerConfig};
use crate::engine::{EngineRequest, EngineResponse, RenderEngine};
use crate::error::ViewerError;
use crate::models::{PageTarget, RenderOptions};
use crate::notation::NotationSurface;
use crate::playback::{Deferred, MidiPlayer, PlaybackCoordinator, Scheduler};
use crate::text::TextEditor;
use crate::view::{ClickEvent, ViewController};

/// Borrowed collaborators for one event
pub struct Host<'a> {
    pub surface: &'a mut dyn NotationSurface,
    pub editor: &'a mut dyn TextEditor,
    pub engine: &'a mut dyn RenderEngine,
    pub player: &'a mut dyn MidiPlayer,
    pub scheduler: &'a mut dyn Scheduler,
}

#[derive(Debug, Clone)]
pub struct Session {
    config: ViewerConfig,
    view: ViewController,
    playback: PlaybackCoordinator,
    /// Skip the reseek after the next page arrives (page-follow flips)
    suppress_next_seek: bool,
    /// Put the cursor on the first element of the next page that arrives
    cursor_to_next_page: bool,
}

impl Session {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            view: ViewController::new(&config),
            playback: PlaybackCoordinator::new(config.debounce_ms),
            config,
            suppress_next_seek: false,
            cursor_to_next_page: false,
        }
    }

    /// Replace the view controller (e.g. with resolved modifier keys)
    pub fn with_view(mut self, view: ViewController) -> Self {
        self.view = view;
        self
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    pub fn playback(&self) -> &PlaybackCoordinator {
        &self.playback
    }

    pub fn set_follow_settings(&mut self, follow: FollowSettings) {
        self.playback.set_follow(follow);
    }

    /// Start a fresh document: forget selection and render from scratch
    pub fn load_document(&mut self, options: Option<RenderOptions>, host: &mut Host<'_>) {
        self.view.clear_selection();
        self.suppress_next_seek = false;
        self.cursor_to_next_page = true;
        let contents = host.editor.contents();
        self.view.apply_options_and_render(&contents, options, false, host);
        host.engine.post(EngineRequest::RenderToMidi);
    }

    /// Apply new options to the current document
    pub fn update_options(&mut self, options: RenderOptions, host: &mut Host<'_>) {
        let contents = host.editor.contents();
        self.view.apply_options_and_render(&contents, Some(options), false, host);
    }

    /// The encoding text changed
    pub fn on_edit(&mut self, host: &mut Host<'_>) {
        let contents = host.editor.contents();
        self.view.apply_options_and_render(&contents, None, false, host);
        self.playback.start_debounced_rerender(true, host.scheduler);
    }

    /// The text cursor moved without an edit
    pub fn on_cursor_moved(&mut self, host: &mut Host<'_>) {
        self.view.update_highlight(host);
        self.playback.start_debounced_rerender(false, host.scheduler);
    }

    pub fn handle_click(&mut self, click: &ClickEvent, host: &mut Host<'_>) -> String {
        let id = self.view.handle_click(click, host);
        self.playback.start_debounced_rerender(false, host.scheduler);
        id
    }

    pub fn set_cursor_to_page_start(&mut self, host: &mut Host<'_>) -> Option<String> {
        self.view.set_cursor_to_page_start(host)
    }

    /// Navigate; returns the new page when it changed
    pub fn change_page(&mut self, target: PageTarget, host: &mut Host<'_>) -> Option<u32> {
        let page = self.view.change_page(target, host.surface)?;
        self.cursor_to_next_page = true;
        self.render_current_page(host);
        Some(page)
    }

    /// Flip to `page`, optionally without reseeking playback afterwards
    pub fn update_page(&mut self, page: u32, seek: bool, host: &mut Host<'_>) {
        if self.change_page(PageTarget::Number(page as i64), host).is_some() {
            self.suppress_next_seek = !seek;
        }
    }

    fn render_current_page(&mut self, host: &mut Host<'_>) {
        if self.view.speed_mode() {
            let contents = host.editor.contents();
            self.view.apply_options_and_render(&contents, None, false, host);
        } else {
            self.view.show_page(None, host);
        }
    }

    pub fn set_speed_mode(&mut self, enabled: bool, host: &mut Host<'_>) {
        if self.view.speed_mode() == enabled {
            return;
        }
        self.view.set_speed_mode(enabled);
        let contents = host.editor.contents();
        self.view.apply_options_and_render(&contents, None, false, host);
    }

    pub fn swap_notation_colors(&mut self, host: &mut Host<'_>) -> bool {
        self.view.swap_notation_colors(host.surface)
    }

    pub fn change_highlight_color(&mut self, color: &str, host: &mut Host<'_>) -> Result<(), ViewerError> {
        self.view.change_highlight_color(color, host.surface)
    }

    /// Write the configured highlight color to the page
    pub fn apply_highlight_color(&mut self, host: &mut Host<'_>) -> Result<(), ViewerError> {
        self.view.change_highlight_color(&self.config.highlight_color, host.surface)
    }

    pub fn request_playback_on_load(&mut self) {
        self.playback.request_playback_on_load();
    }

    pub fn seek_to_time(&mut self, time_ms: f64, host: &mut Host<'_>) {
        self.playback.seek_to_time(time_ms, host);
    }

    pub fn seek_to_selection_or_page(&mut self, host: &mut Host<'_>) {
        self.playback.seek_to_selection_or_page(self.view.selection().ids(), host);
    }

    pub fn stop_playback(&mut self, host: &mut Host<'_>) {
        self.playback.stop(host);
    }

    /// A note event from the player (`None` re-evaluates the last time)
    pub fn on_playback_note(&mut self, note_start_secs: Option<f64>, host: &mut Host<'_>) {
        self.playback.on_playback_tick(note_start_secs, host);
    }

    /// A scheduled timer fired
    pub fn on_timer(&mut self, task: Deferred, host: &mut Host<'_>) {
        match task {
            Deferred::Rerender => {
                self.playback.debounce_fired();
                host.engine.post(EngineRequest::RenderToMidi);
            }
            Deferred::Reseek => {
                self.playback.debounce_fired();
                self.seek_to_selection_or_page(host);
            }
            note_task => self.playback.run_note_task(&note_task, host),
        }
    }

    /// An answer from the rendering engine
    pub fn on_engine_response(&mut self, response: EngineResponse, host: &mut Host<'_>) {
        match response {
            EngineResponse::DataLoaded { page_count } => {
                self.view.on_data_loaded(page_count, host);
            }
            EngineResponse::Page { page, svg } => self.on_page_rendered(page, &svg, host),
            EngineResponse::Midi { midi, timemap } => {
                host.player.load_midi(&midi);
                self.playback.set_timemap(timemap);
                self.seek_to_selection_or_page(host);
            }
            EngineResponse::TimeForElement { id, time } => {
                log::debug!("Seeking playback to {} at {} ms", id, time);
                self.playback.seek_to_time(time, host);
            }
            EngineResponse::PageWithElement { id, page } => match page {
                Some(page) if page != self.view.pagination().current() => {
                    // disable playback seek after page flip
                    self.update_page(page, false, host);
                }
                Some(_) => {}
                None => log::warn!(
                    "Expected to highlight currently playing note, but couldn't find it: {}",
                    id
                ),
            },
            EngineResponse::Error { msg } => log::warn!("Rendering engine error: {}", msg),
        }
    }

    fn on_page_rendered(&mut self, page: u32, svg: &str, host: &mut Host<'_>) {
        if let Err(e) = host.surface.load_page(svg) {
            log::warn!("Could not index rendered page {}: {}", page, e);
            return;
        }
        host.surface.attach_click_listeners();
        self.view.apply_notation_colors(host.surface);
        if std::mem::take(&mut self.cursor_to_next_page) {
            self.view.set_cursor_to_page_start(host);
        }
        self.view.update_highlight(host);

        if std::mem::take(&mut self.suppress_next_seek) {
            return;
        }
        if !self.playback.timemap().is_empty() {
            self.seek_to_selection_or_page(host);
        }
    }
}
