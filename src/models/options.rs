//! Rendering options sent to the engine

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Size of the notation container plus the zoom control value
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Zoom in percent
    pub zoom: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 800.0, height: 600.0, zoom: 100 }
    }
}

/// Engine options
///
/// Only the fields the viewer computes are typed; everything else the host
/// passes in travels through `extra` untouched.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(default = "default_scale")]
    pub scale: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_height: Option<u32>,

    #[serde(default = "default_breaks")]
    pub breaks: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_scale() -> u32 {
    100
}

fn default_breaks() -> String {
    "auto".to_string()
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            page_width: None,
            page_height: None,
            breaks: default_breaks(),
            extra: Map::new(),
        }
    }
}

impl RenderOptions {
    /// Page breaking switched off: the engine lays out one endless page
    pub fn breaks_disabled(&self) -> bool {
        self.breaks == "none"
    }

    /// Fit scale and page dimensions to the viewport
    ///
    /// Page size is left alone when breaking is disabled.
    pub fn fit_to(&mut self, viewport: Viewport, min_dimension: u32) {
        self.scale = viewport.zoom.max(1);
        if self.breaks_disabled() {
            return;
        }
        let factor = 100.0 / self.scale as f64;
        let fit = |extent: f64| ((extent * factor).round().max(0.0) as u32).max(min_dimension);
        self.page_width = Some(fit(viewport.width));
        self.page_height = Some(fit(viewport.height));
    }
}
