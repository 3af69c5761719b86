//! Error types for the score viewer
//!
//! Only configuration, encoding extraction and SVG indexing can fail.
//! Playback and view operations degrade to warnings instead of erroring.

use thiserror::Error;

/// Top-level error type
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Configuration could not be parsed
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Speed-mode page extraction failed
    #[error("speed mode: {0}")]
    SpeedMode(#[from] SpeedModeError),

    /// Rendered page SVG could not be indexed
    #[error("invalid page svg: {0}")]
    PageSvg(String),

    /// Highlight color rejected or CSS template failed
    #[error("highlight style: {0}")]
    Style(String),

    /// Unknown page navigation keyword
    #[error("unknown page target '{0}' (expected a number, first, last, forwards or backwards)")]
    PageTarget(String),
}

/// Configuration parsing errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Speed-mode extraction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeedModeError {
    #[error("xml: {0}")]
    Xml(String),

    #[error("encoding has no <section> element")]
    MissingSection,

    #[error("page {page} out of range (encoding has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },
}

pub type Result<T> = std::result::Result<T, ViewerError>;
