//! Worker message protocol
//!
//! Requests and responses are JSON-shaped objects tagged by `cmd`, matching
//! what the rendering worker posts and expects.

use serde::{Deserialize, Serialize};

use crate::models::{RenderOptions, TimemapEntry};

/// Request posted to the rendering engine
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum EngineRequest {
    SetOptions {
        msg: RenderOptions,
        /// Whether the engine should reload its data after applying options
        #[serde(rename = "loadData")]
        load_data: bool,
    },
    LoadData {
        msg: String,
    },
    GetPage {
        msg: u32,
    },
    GetTimeForElement {
        msg: String,
    },
    GetPageWithElement {
        msg: String,
    },
    /// Render MIDI and the timemap of the loaded data
    RenderToMidi,
}

/// Response posted back by the rendering engine
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum EngineResponse {
    DataLoaded {
        #[serde(rename = "pageCount")]
        page_count: u32,
    },
    Page {
        page: u32,
        svg: String,
    },
    Midi {
        /// Base64 encoded standard MIDI file
        midi: String,
        timemap: Vec<TimemapEntry>,
    },
    TimeForElement {
        id: String,
        /// Milliseconds
        time: f64,
    },
    PageWithElement {
        id: String,
        #[serde(default)]
        page: Option<u32>,
    },
    Error {
        msg: String,
    },
}
