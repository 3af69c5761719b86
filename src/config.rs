//! Viewer configuration
//!
//! All fields have defaults so partial JSON/YAML documents are accepted.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ViewerError};
use crate::view::style::is_plain_color;

/// Delay between the last edit and the deferred re-render/reseek
pub const DEFAULT_DEBOUNCE_MS: u32 = 400;

/// Which modifier key extends the selection on click
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModifierConvention {
    /// Decide from the browser's navigator at startup
    #[default]
    Auto,
    /// Cmd (meta) or Ctrl
    Mac,
    /// Ctrl only
    Other,
}

impl ModifierConvention {
    /// Resolve `Auto` against a navigator `appVersion` string
    pub fn resolve(self, app_version: &str) -> Self {
        match self {
            ModifierConvention::Auto if app_version.contains("Mac") => ModifierConvention::Mac,
            ModifierConvention::Auto => ModifierConvention::Other,
            other => other,
        }
    }
}

/// Ids of the DOM elements the viewer talks to
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DomIds {
    pub panel: String,
    pub page_label: String,
    pub custom_style: String,
    pub zoom_control: String,
    pub midi_player: String,
    pub highlight_checkbox: String,
    pub page_follow_checkbox: String,
    pub scroll_follow_checkbox: String,
}

impl Default for DomIds {
    fn default() -> Self {
        Self {
            panel: "verovio-panel".to_string(),
            page_label: "pagination-label".to_string(),
            custom_style: "customStyle".to_string(),
            zoom_control: "verovio-zoom".to_string(),
            midi_player: "midi-player".to_string(),
            highlight_checkbox: "highlightCurrentlySoundingNotes".to_string(),
            page_follow_checkbox: "pageFollowMidiPlayback".to_string(),
            scroll_follow_checkbox: "scrollFollowMidiPlayback".to_string(),
        }
    }
}

/// Complete viewer configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    /// Edit-to-render debounce delay (ms)
    pub debounce_ms: u32,

    /// Feed only the current page to the engine
    pub speed_mode: bool,

    /// Element names that delimit pages in speed mode
    pub break_elements: Vec<String>,

    /// Zoom used when no zoom control is present (percent)
    pub default_zoom: u32,

    /// Lower bound for computed page width/height
    pub min_page_dimension: u32,

    /// Color of selection highlighting
    pub highlight_color: String,

    pub modifier_convention: ModifierConvention,

    pub dom: DomIds,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            speed_mode: false,
            break_elements: vec!["sb".to_string(), "pb".to_string()],
            default_zoom: 100,
            min_page_dimension: 100,
            highlight_color: "#d00".to_string(),
            modifier_convention: ModifierConvention::Auto,
            dom: DomIds::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self, ViewerError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML configuration document
    pub fn from_yaml(yaml: &str) -> Result<Self, ViewerError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the viewer cannot work with
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.default_zoom == 0 {
            return Err(ConfigError::Invalid {
                field: "defaultZoom",
                reason: "zoom must be positive".to_string(),
            }
            .into());
        }
        if self.break_elements.iter().any(|b| b.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "breakElements",
                reason: "empty element name".to_string(),
            }
            .into());
        }
        if !is_plain_color(&self.highlight_color) {
            return Err(ConfigError::Invalid {
                field: "highlightColor",
                reason: format!("unsupported color '{}'", self.highlight_color),
            }
            .into());
        }
        Ok(())
    }
}

/// User toggles for tracking the sounding notes
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct FollowSettings {
    /// Highlight currently sounding notes
    pub highlight: bool,
    /// Flip pages to follow playback
    pub page_follow: bool,
    /// Scroll to the measure being played
    pub scroll_follow: bool,
}

impl FollowSettings {
    pub fn any(&self) -> bool {
        self.highlight || self.page_follow || self.scroll_follow
    }
}
