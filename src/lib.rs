//! Score Viewer WASM Module
//!
//! Browser-side presentation layer of an MEI score editor. It keeps the
//! encoding text buffer and the rendered notation in sync, drives the MIDI
//! playback cursor and highlights sounding or selected elements.
//!
//! Everything stateful lives in [`session::Session`]; the outside world
//! (DOM, rendering worker, text editor, MIDI player, timers) is reached
//! through the traits collected in [`session::Host`].

pub mod error;
pub mod config;
pub mod models;
pub mod text;
pub mod notation;
pub mod engine;
pub mod playback;
pub mod view;
pub mod session;
pub mod api;

// Re-export commonly used types
pub use config::{FollowSettings, ViewerConfig};
pub use error::{Result, ViewerError};
pub use models::*;
pub use session::{Host, Session};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    if console_log::init_with_level(log::Level::Debug).is_err() {
        // A logger is already installed (module re-initialised).
        return;
    }

    log::info!("Score viewer WASM module initialized");
}
