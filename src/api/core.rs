//! WASM API for the score viewer
//!
//! Viewer state lives in a WASM-owned global, and JS handles (worker,
//! editor) in a thread-local since they are not `Send`. Every exported call
//! builds a [`Host`] from the live page, runs one session operation and
//! drops the host again.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, Event, MessageEvent, Worker};

use crate::config::{DomIds, ViewerConfig};
use crate::engine::EngineResponse;
use crate::models::{PageTarget, RenderOptions};
use crate::notation::ElementIndex;
use crate::playback::{Deferred, TimerHandle};
use crate::session::{Host, Session};
use crate::view::{ClickEvent, ViewController};
use crate::{wasm_info, wasm_log, wasm_warn};

use super::bridges::{JsMidiPlayer, JsTextEditor, WindowScheduler, WorkerEngine};
use super::dom::{read_follow_settings, DomSurface};
use super::helpers::{deserialize, deserialize_optional, js_error, serialize};

/// Everything the viewer owns between events
struct ViewerState {
    session: Session,
    page: ElementIndex,
    timers: BTreeMap<u64, i32>,
    next_timer: u64,
}

/// JS-side collaborators
struct BrowserContext {
    worker: Worker,
    editor: JsValue,
    dom: DomIds,
    default_zoom: u32,
}

// WASM-owned viewer storage
static VIEWER: Lazy<Mutex<Option<ViewerState>>> = Lazy::new(|| Mutex::new(None));

thread_local! {
    static BROWSER: RefCell<Option<BrowserContext>> = const { RefCell::new(None) };
}

/// Run one session operation against the live page
fn with_host<R>(op: impl FnOnce(&mut Session, &mut Host<'_>) -> R) -> Result<R, JsValue> {
    // a JS callback fired synchronously from inside another operation
    let mut guard = VIEWER
        .try_lock()
        .map_err(|_| JsValue::from_str("viewer is busy handling another event"))?;
    let state = guard
        .as_mut()
        .ok_or_else(|| js_error("viewer not initialized; call initViewer() first"))?;
    let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
    let document = window.document().ok_or_else(|| js_error("no document"))?;

    BROWSER.with(|cell| {
        let context = cell.borrow();
        let context = context
            .as_ref()
            .ok_or_else(|| js_error("viewer not initialized; call initViewer() first"))?;
        let ViewerState { session, page, timers, next_timer } = state;

        let player_element = document.get_element_by_id(&context.dom.midi_player);
        let mut surface = DomSurface::new(page, document, &context.dom, context.default_zoom);
        let mut editor = JsTextEditor::new(&context.editor);
        let mut engine = WorkerEngine::new(&context.worker);
        let mut player = JsMidiPlayer::new(player_element);
        let mut scheduler = WindowScheduler::new(&window, timers, next_timer);
        let mut host = Host {
            surface: &mut surface,
            editor: &mut editor,
            engine: &mut engine,
            player: &mut player,
            scheduler: &mut scheduler,
        };
        Ok(op(session, &mut host))
    })
}

/// Event-driven entry: errors are logged, not returned
fn dispatch(context: &str, op: impl FnOnce(&mut Session, &mut Host<'_>)) {
    if let Err(e) = with_host(op) {
        wasm_log!("{} dropped: {:?}", context, e);
    }
}

pub(crate) fn dispatch_click(click: ClickEvent) {
    dispatch("click", |session, host| {
        session.handle_click(&click, host);
    });
}

pub(crate) fn fire_timer(handle: TimerHandle, task: Deferred) {
    dispatch("timer", |session, host| {
        session.on_timer(task, host);
    });
    if let Ok(mut guard) = VIEWER.try_lock() {
        if let Some(state) = guard.as_mut() {
            state.timers.remove(&handle.0);
        }
    }
}

fn on_player_note(event: Event) {
    let start_secs = event
        .dyn_into::<CustomEvent>()
        .ok()
        .and_then(|e| js_sys::Reflect::get(&e.detail(), &JsValue::from_str("note")).ok())
        .and_then(|note| js_sys::Reflect::get(&note, &JsValue::from_str("startTime")).ok())
        .and_then(|t| t.as_f64());
    if let Err(e) = on_playback_note(start_secs) {
        log::debug!("note event dropped: {:?}", e);
    }
}

/// Wire worker answers and player note events back into the viewer
fn wire_events(worker: &Worker, dom: &DomIds) -> Result<(), JsValue> {
    let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        if let Err(e) = on_engine_message(event.data()) {
            log::debug!("engine message dropped: {:?}", e);
        }
    });
    worker.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    on_message.forget();

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| js_error("no document"))?;
    match document.get_element_by_id(&dom.midi_player) {
        Some(player) => {
            let on_note = Closure::<dyn FnMut(Event)>::new(on_player_note);
            player.add_event_listener_with_callback("note", on_note.as_ref().unchecked_ref())?;
            on_note.forget();
        }
        None => wasm_warn!("MIDI player #{} not found, playback highlighting disabled", dom.midi_player),
    }
    Ok(())
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Set up the viewer
///
/// # Parameters
/// - `config_js`: partial `ViewerConfig` object (or `undefined` for defaults)
/// - `worker`: the rendering worker
/// - `editor`: text editor object with `getValue`, `getCursor`, `setCursor`
#[wasm_bindgen(js_name = initViewer)]
pub fn init_viewer(config_js: JsValue, worker: Worker, editor: JsValue) -> Result<(), JsValue> {
    let config: ViewerConfig = deserialize_optional(config_js, "Failed to deserialize viewer config")?
        .unwrap_or_default();
    config.validate().map_err(js_error)?;

    let app_version = web_sys::window()
        .and_then(|w| w.navigator().app_version().ok())
        .unwrap_or_default();
    let modifiers = config.modifier_convention.resolve(&app_version);
    let view = ViewController::new(&config).with_modifiers(modifiers);

    wire_events(&worker, &config.dom)?;
    BROWSER.with(|cell| {
        *cell.borrow_mut() = Some(BrowserContext {
            worker,
            editor,
            dom: config.dom.clone(),
            default_zoom: config.default_zoom,
        });
    });

    let session = Session::new(config).with_view(view);
    {
        let mut guard = VIEWER
            .try_lock()
            .map_err(|_| JsValue::from_str("viewer is busy handling another event"))?;
        *guard = Some(ViewerState {
            session,
            page: ElementIndex::default(),
            timers: BTreeMap::new(),
            next_timer: 0,
        });
    }
    with_host(|session, host| session.apply_highlight_color(host))?.map_err(js_error)?;
    wasm_info!("initViewer: modifiers {:?}", modifiers);
    Ok(())
}

/// Render the editor's encoding from scratch
#[wasm_bindgen(js_name = loadDocument)]
pub fn load_document(options_js: JsValue) -> Result<(), JsValue> {
    let options: Option<RenderOptions> =
        deserialize_optional(options_js, "Failed to deserialize render options")?;
    with_host(|session, host| session.load_document(options, host))
}

#[wasm_bindgen(js_name = updateOptions)]
pub fn update_options(options_js: JsValue) -> Result<(), JsValue> {
    let options: RenderOptions = deserialize(options_js, "Failed to deserialize render options")?;
    with_host(|session, host| session.update_options(options, host))
}

/// The editor's text changed
#[wasm_bindgen(js_name = onEdit)]
pub fn on_edit() {
    dispatch("edit", |session, host| session.on_edit(host));
}

/// The editor's cursor moved
#[wasm_bindgen(js_name = onCursorMoved)]
pub fn on_cursor_moved() {
    dispatch("cursor move", |session, host| session.on_cursor_moved(host));
}

/// Feed a message received from the rendering worker
#[wasm_bindgen(js_name = onEngineMessage)]
pub fn on_engine_message(data: JsValue) -> Result<(), JsValue> {
    let response: EngineResponse = deserialize(data, "Failed to deserialize engine message")?;
    with_host(|session, host| session.on_engine_response(response, host))
}

// ============================================================================
// Navigation and selection
// ============================================================================

/// Change page: a number or `first`/`last`/`forwards`/`backwards`
///
/// Returns the new page, or `undefined` when nothing changed.
#[wasm_bindgen(js_name = changePage)]
pub fn change_page(target: &str) -> Result<Option<u32>, JsValue> {
    let target: PageTarget = target.parse().map_err(js_error)?;
    with_host(|session, host| session.change_page(target, host))
}

#[wasm_bindgen(js_name = handleClick)]
pub fn handle_click(click_js: JsValue) -> Result<String, JsValue> {
    let click: ClickEvent = deserialize(click_js, "Failed to deserialize click")?;
    with_host(|session, host| session.handle_click(&click, host))
}

#[wasm_bindgen(js_name = setCursorToPageStart)]
pub fn set_cursor_to_page_start() -> Result<Option<String>, JsValue> {
    with_host(|session, host| session.set_cursor_to_page_start(host))
}

#[wasm_bindgen(js_name = setSpeedMode)]
pub fn set_speed_mode(enabled: bool) -> Result<(), JsValue> {
    with_host(|session, host| session.set_speed_mode(enabled, host))
}

// ============================================================================
// Colors
// ============================================================================

/// Toggle night mode; returns the new state
#[wasm_bindgen(js_name = swapNotationColors)]
pub fn swap_notation_colors() -> Result<bool, JsValue> {
    with_host(|session, host| session.swap_notation_colors(host))
}

#[wasm_bindgen(js_name = changeHighlightColor)]
pub fn change_highlight_color(color: &str) -> Result<(), JsValue> {
    with_host(|session, host| session.change_highlight_color(color, host))?.map_err(js_error)
}

// ============================================================================
// Playback
// ============================================================================

/// A note event from the player; reads the follow checkboxes first
#[wasm_bindgen(js_name = onPlaybackNote)]
pub fn on_playback_note(start_secs: Option<f64>) -> Result<(), JsValue> {
    let follow = BROWSER.with(|cell| {
        let context = cell.borrow();
        let context = context.as_ref()?;
        let document = web_sys::window()?.document()?;
        Some(read_follow_settings(&document, &context.dom))
    });
    with_host(|session, host| {
        if let Some(follow) = follow {
            session.set_follow_settings(follow);
        }
        session.on_playback_note(start_secs, host);
    })
}

#[wasm_bindgen(js_name = seekToSelectionOrPage)]
pub fn seek_to_selection_or_page() -> Result<(), JsValue> {
    with_host(|session, host| session.seek_to_selection_or_page(host))
}

#[wasm_bindgen(js_name = seekToTime)]
pub fn seek_to_time(time_ms: f64) -> Result<(), JsValue> {
    with_host(|session, host| session.seek_to_time(time_ms, host))
}

/// Start the player as soon as the next seek lands
#[wasm_bindgen(js_name = requestPlaybackOnLoad)]
pub fn request_playback_on_load() -> Result<(), JsValue> {
    with_host(|session, _| session.request_playback_on_load())
}

#[wasm_bindgen(js_name = stopPlayback)]
pub fn stop_playback() -> Result<(), JsValue> {
    with_host(|session, host| session.stop_playback(host))
}

// ============================================================================
// State inspection
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewState {
    page: u32,
    page_count: u32,
    selection: Vec<String>,
    last_note_id: Option<String>,
    night_mode: bool,
    speed_mode: bool,
}

/// Snapshot of pagination, selection and mode flags
#[wasm_bindgen(js_name = getViewState)]
pub fn get_view_state() -> Result<JsValue, JsValue> {
    let guard = VIEWER
        .try_lock()
        .map_err(|_| JsValue::from_str("viewer is busy handling another event"))?;
    let state = guard
        .as_ref()
        .ok_or_else(|| js_error("viewer not initialized; call initViewer() first"))?;
    let view = state.session.view();
    let snapshot = ViewState {
        page: view.pagination().current(),
        page_count: view.pagination().count(),
        selection: view.selection().ids().to_vec(),
        last_note_id: view.last_note_id().map(str::to_string),
        night_mode: view.night_mode(),
        speed_mode: view.speed_mode(),
    };
    serialize(&snapshot, "Failed to serialize view state")
}
