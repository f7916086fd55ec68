//! # Configuration
//!
//! Defaults for new frames and the frame-id generator, loadable from JSON.

use crate::error::{DeckError, Result};
use crate::frame::LayerProperty;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Initial values of a new frame's own properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameDefaults {
    pub title: String,
    pub timeout_ms: u64,
    pub timeout_enable: bool,
    pub transition_duration_ms: u64,
    pub show_in_frame_list: bool,
}

impl Default for FrameDefaults {
    fn default() -> Self {
        Self {
            title: "New frame".to_string(),
            timeout_ms: 0,
            timeout_enable: false,
            transition_duration_ms: 1000,
            show_in_frame_list: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Prefix of generated frame ids.
    pub frame_id_prefix: String,
    /// Seed for frame-id generation. `None` seeds from the OS.
    pub seed: Option<u64>,
    pub frame: FrameDefaults,
    /// Per-layer properties given to every layer of a new frame.
    pub layer: LayerProperty,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            frame_id_prefix: "frame".to_string(),
            seed: None,
            frame: FrameDefaults::default(),
            layer: LayerProperty::default(),
        }
    }
}

impl DeckConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| DeckError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DeckError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.frame_id_prefix.is_empty() {
            return Err(DeckError::Config("frame_id_prefix must not be empty".into()));
        }
        if !self.layer.transition_relative_zoom.is_finite() {
            return Err(DeckError::Config(
                "layer.transition_relative_zoom must be finite".into(),
            ));
        }
        Ok(())
    }
}
