//! Adapters for the JS-side collaborators
//!
//! - `WorkerEngine`: the rendering worker
//! - `JsMidiPlayer`: the `<midi-player>` element
//! - `JsTextEditor`: a CodeMirror-like editor object
//! - `WindowScheduler`: `setTimeout`-backed timers

use std::collections::BTreeMap;

use js_sys::{Function, Object, Reflect};
use once_cell::unsync::OnceCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Window, Worker};

use crate::engine::{EngineRequest, RenderEngine};
use crate::playback::{Deferred, MidiPlayer, Scheduler, TimerHandle};
use crate::text::{BufferPos, BufferRange, EncodingBuffer, TextEditor};

use super::helpers;

/// Look up `name` on `target` and call it as a method
fn call_method(target: &JsValue, name: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
    let method = Reflect::get(target, &JsValue::from_str(name))?
        .dyn_into::<Function>()
        .map_err(|_| JsValue::from_str(&format!("{} is not a function", name)))?;
    match args {
        [] => method.call0(target),
        [a] => method.call1(target, a),
        [a, b, ..] => method.call2(target, a, b),
    }
}

// ============================================================================
// Rendering worker
// ============================================================================

pub struct WorkerEngine<'a> {
    worker: &'a Worker,
}

impl<'a> WorkerEngine<'a> {
    pub fn new(worker: &'a Worker) -> Self {
        Self { worker }
    }
}

impl RenderEngine for WorkerEngine<'_> {
    fn post(&mut self, request: EngineRequest) {
        let Ok(message) = helpers::serialize(&request, "Failed to serialize engine request") else {
            return;
        };
        if let Err(e) = self.worker.post_message(&message) {
            log::warn!("Could not post to rendering worker: {:?}", e);
        }
    }
}

// ============================================================================
// MIDI player element
// ============================================================================

pub struct JsMidiPlayer {
    element: Option<Element>,
}

impl JsMidiPlayer {
    pub fn new(element: Option<Element>) -> Self {
        if element.is_none() {
            log::debug!("No MIDI player element; playback calls are ignored");
        }
        Self { element }
    }

    fn call(&self, name: &str) {
        if let Some(element) = &self.element {
            if let Err(e) = call_method(element, name, &[]) {
                log::warn!("MIDI player {}() failed: {:?}", name, e);
            }
        }
    }

    fn set(&self, property: &str, value: &JsValue) {
        if let Some(element) = &self.element {
            if let Err(e) = Reflect::set(element, &JsValue::from_str(property), value) {
                log::warn!("Could not set MIDI player {}: {:?}", property, e);
            }
        }
    }
}

impl MidiPlayer for JsMidiPlayer {
    fn is_playing(&self) -> bool {
        self.element
            .as_ref()
            .and_then(|element| Reflect::get(element, &JsValue::from_str("playing")).ok())
            .and_then(|playing| playing.as_bool())
            .unwrap_or(false)
    }

    fn start(&mut self) {
        self.call("start");
    }

    fn stop(&mut self) {
        self.call("stop");
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.set("currentTime", &JsValue::from_f64(seconds));
    }

    fn load_midi(&mut self, base64: &str) {
        self.set("src", &JsValue::from_str(&format!("data:audio/midi;base64,{}", base64)));
    }
}

// ============================================================================
// Text editor
// ============================================================================

/// Editor object exposing `getValue()`, `getCursor()` and `setCursor({line, ch})`
///
/// The text is snapshotted on the first lookup, so events that never touch
/// the buffer (note events, timers) do not copy the document. The editor's
/// `ch` counts UTF-16 code units and is converted at this boundary.
pub struct JsTextEditor<'a> {
    editor: &'a JsValue,
    buffer: OnceCell<EncodingBuffer>,
}

impl<'a> JsTextEditor<'a> {
    pub fn new(editor: &'a JsValue) -> Self {
        Self { editor, buffer: OnceCell::new() }
    }

    /// Whether the editor text has been read yet
    pub fn is_loaded(&self) -> bool {
        self.buffer.get().is_some()
    }

    fn buffer(&self) -> &EncodingBuffer {
        self.buffer.get_or_init(|| snapshot(self.editor))
    }
}

fn snapshot(editor: &JsValue) -> EncodingBuffer {
    let text = call_method(editor, "getValue", &[])
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_else(|| {
            log::warn!("Editor getValue() did not return text");
            String::new()
        });
    let mut buffer = EncodingBuffer::new(text);
    if let Some((line, ch)) = call_method(editor, "getCursor", &[]).ok().and_then(|c| read_pos(&c)) {
        let pos = buffer.pos_from_utf16(line, ch);
        buffer.set_cursor(pos);
    }
    buffer
}

fn read_pos(value: &JsValue) -> Option<(usize, usize)> {
    let field = |name: &str| {
        Reflect::get(value, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.as_f64())
            .map(|v| v.max(0.0) as usize)
    };
    Some((field("line")?, field("ch")?))
}

fn write_pos(line: usize, ch: usize) -> Result<JsValue, JsValue> {
    let object = Object::new();
    Reflect::set(&object, &JsValue::from_str("line"), &JsValue::from_f64(line as f64))?;
    Reflect::set(&object, &JsValue::from_str("ch"), &JsValue::from_f64(ch as f64))?;
    Ok(object.into())
}

impl TextEditor for JsTextEditor<'_> {
    fn cursor(&self) -> BufferPos {
        self.buffer().cursor()
    }

    fn set_cursor(&mut self, pos: BufferPos) {
        self.buffer();
        let Some(buffer) = self.buffer.get_mut() else {
            return;
        };
        buffer.set_cursor(pos);
        let pos = buffer.cursor();
        let ch = buffer.utf16_column(pos);
        if let Err(e) = write_pos(pos.row, ch).and_then(|p| call_method(self.editor, "setCursor", &[p])) {
            log::warn!("Editor setCursor() failed: {:?}", e);
        }
    }

    fn contents(&self) -> String {
        self.buffer().contents()
    }

    fn locate_id(&self, id: &str) -> Option<BufferRange> {
        self.buffer().locate_id(id)
    }

    fn element_n_above(&self, row: usize, element: &str) -> Option<String> {
        self.buffer().element_n_above(row, element)
    }

    fn attribute_by_id(&self, id: &str, attribute: &str) -> Option<String> {
        self.buffer().attribute_by_id(id, attribute)
    }

    fn element_id_at_cursor(&self) -> Option<String> {
        self.buffer().element_id_at_cursor()
    }
}

// ============================================================================
// Timers
// ============================================================================

/// Maps scheduler handles to `setTimeout` ids; fired timers call back into
/// the viewer with their task.
pub struct WindowScheduler<'a> {
    window: &'a Window,
    timers: &'a mut BTreeMap<u64, i32>,
    next_handle: &'a mut u64,
}

impl<'a> WindowScheduler<'a> {
    pub fn new(window: &'a Window, timers: &'a mut BTreeMap<u64, i32>, next_handle: &'a mut u64) -> Self {
        Self { window, timers, next_handle }
    }
}

impl Scheduler for WindowScheduler<'_> {
    fn schedule(&mut self, delay_ms: f64, task: Deferred) -> TimerHandle {
        *self.next_handle += 1;
        let handle = TimerHandle(*self.next_handle);
        let callback = Closure::once_into_js(move || super::core::fire_timer(handle, task));
        let delay = delay_ms.max(0.0).round() as i32;
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
        {
            Ok(timeout_id) => {
                self.timers.insert(handle.0, timeout_id);
            }
            Err(e) => log::warn!("setTimeout failed: {:?}", e),
        }
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(timeout_id) = self.timers.remove(&handle.0) {
            self.window.clear_timeout_with_handle(timeout_id);
        }
    }
}
