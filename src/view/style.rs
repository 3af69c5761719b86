//! Selection highlight stylesheet

use serde::Serialize;

use crate::error::ViewerError;

const HIGHLIGHT_TEMPLATE: &str = include_str!("templates/highlight.css.mustache");

#[derive(Debug, Clone, Serialize)]
struct HighlightContext<'a> {
    panel: &'a str,
    color: &'a str,
}

/// Colors are written into CSS verbatim, so only plain color syntax passes
pub(crate) fn is_plain_color(color: &str) -> bool {
    !color.trim().is_empty()
        && color
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "#(),.% -".contains(c))
}

/// CSS rule coloring highlighted elements inside the panel
pub fn highlight_css(panel_id: &str, color: &str) -> Result<String, ViewerError> {
    if !is_plain_color(color) {
        return Err(ViewerError::Style(format!("unsupported color '{}'", color)));
    }
    let template =
        mustache::compile_str(HIGHLIGHT_TEMPLATE).map_err(|e| ViewerError::Style(e.to_string()))?;
    template
        .render_to_string(&HighlightContext { panel: panel_id, color: color.trim() })
        .map_err(|e| ViewerError::Style(e.to_string()))
}
