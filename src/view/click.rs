//! Clicks on rendered notation

use serde::{Deserialize, Serialize};

use crate::config::ModifierConvention;

/// A click on an element of the rendered page
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ClickEvent {
    /// Id of the element the listener was attached to
    pub target_id: String,
    pub alt_key: bool,
    pub ctrl_key: bool,
    pub meta_key: bool,
}

impl ClickEvent {
    pub fn plain(target_id: impl Into<String>) -> Self {
        Self { target_id: target_id.into(), ..Default::default() }
    }

    /// Cmd on macOS, Ctrl everywhere
    pub fn extends_selection(&self, convention: ModifierConvention) -> bool {
        self.ctrl_key || (convention == ModifierConvention::Mac && self.meta_key)
    }
}
