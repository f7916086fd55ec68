//! Serializable snapshot of a presentation, for tooling and logs.

use crate::camera::CameraState;
use crate::frame::LayerProperty;
use crate::presentation::Presentation;
use crate::types::{LayerId, NodeId};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LayerSummary {
    pub index: usize,
    pub id: LayerId,
    pub label: String,
    pub auto: bool,
    pub nodes: Vec<NodeId>,
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameSummary {
    pub index: usize,
    pub frame_id: String,
    pub title: String,
    pub timeout_ms: u64,
    pub timeout_enable: bool,
    pub transition_duration_ms: u64,
    pub show_in_frame_list: bool,
    pub camera_states: Vec<CameraState>,
    pub layer_properties: Vec<LayerProperty>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresentationSummary {
    pub layers: Vec<LayerSummary>,
    pub frames: Vec<FrameSummary>,
}

impl Presentation {
    pub fn summary(&self) -> PresentationSummary {
        let layers = self
            .layers()
            .iter()
            .enumerate()
            .map(|(index, layer)| LayerSummary {
                index,
                id: layer.id(),
                label: layer.label().to_string(),
                auto: layer.is_auto(),
                nodes: layer.nodes().to_vec(),
                visible: layer.is_visible(self.document()),
            })
            .collect();

        let frames = self
            .frames()
            .iter()
            .enumerate()
            .map(|(index, frame)| FrameSummary {
                index,
                frame_id: frame.frame_id().to_string(),
                title: frame.title().to_string(),
                timeout_ms: frame.timeout_ms(),
                timeout_enable: frame.timeout_enable(),
                transition_duration_ms: frame.transition_duration_ms(),
                show_in_frame_list: frame.show_in_frame_list(),
                camera_states: frame.camera_states().to_vec(),
                layer_properties: frame.layer_properties().to_vec(),
            })
            .collect();

        PresentationSummary { layers, frames }
    }
}
