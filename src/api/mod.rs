//! Score Viewer WASM API
//!
//! JavaScript-facing entry points plus the browser implementations of the
//! session's collaborator traits.
//!
//! # Module Structure
//!
//! - `helpers`: console logging macros, serialization and error conversion
//! - `dom`: the DOM-backed notation surface
//! - `bridges`: rendering worker, MIDI player, text editor and timer adapters
//! - `core`: viewer state and the exported functions

pub mod helpers;
pub mod dom;
pub mod bridges;
pub mod core;

pub use core::*;
