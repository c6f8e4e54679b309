//! Scroll measurements reported by the host UI.

use serde::{Deserialize, Serialize};

use crate::errors::{CodecError, Result};

/// Raw scroll measurement of the message pane, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollEvent {
    /// Total height of the scrollable content.
    pub scroll_height: f64,
    /// Distance scrolled from the top.
    pub scroll_top: f64,
    /// Visible height of the pane.
    pub client_height: f64,
}

impl ScrollEvent {
    /// Parse the host UI's JSON scroll payload.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(CodecError::Malformed)
    }

    /// Whether the viewport bottom is within `margin` pixels of the content
    /// bottom.
    pub fn is_near_bottom(&self, margin: f64) -> bool {
        (self.scroll_height - self.scroll_top) < (self.client_height + margin)
    }
}
