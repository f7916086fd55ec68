//! # Frame
//!
//! A frame is a snapshot of per-layer camera state plus per-layer
//! presentation settings.
//!
//! ## Key Types
//! - `Frame`: Frame-level properties and the two per-layer arrays.
//! - `LayerProperty`: Clipping, reference element and transition settings for one layer.
//! - `TimingFunction`: Named transition easing, stored but never evaluated here.

use crate::camera::CameraState;
use crate::error::{DeckError, Result};
use crate::observe::{ChangeEvent, Observers, SubscriptionId};
use crate::presentation::Presentation;
use crate::types::PresentationId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Transition easing between two frames, for one layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimingFunction {
    #[default]
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    StepStart,
    StepEnd,
}

impl TimingFunction {
    pub const ALL: [TimingFunction; 7] = [
        TimingFunction::Linear,
        TimingFunction::Ease,
        TimingFunction::EaseIn,
        TimingFunction::EaseOut,
        TimingFunction::EaseInOut,
        TimingFunction::StepStart,
        TimingFunction::StepEnd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimingFunction::Linear => "linear",
            TimingFunction::Ease => "ease",
            TimingFunction::EaseIn => "ease-in",
            TimingFunction::EaseOut => "ease-out",
            TimingFunction::EaseInOut => "ease-in-out",
            TimingFunction::StepStart => "step-start",
            TimingFunction::StepEnd => "step-end",
        }
    }
}

impl fmt::Display for TimingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimingFunction {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DeckError::Config(format!("unknown timing function: {s}")))
    }
}

/// Per-layer presentation settings of a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerProperty {
    pub clip: bool,
    pub reference_element_id: String,
    pub reference_element_hide: bool,
    pub transition_timing_function: TimingFunction,
    pub transition_relative_zoom: f64,
    pub transition_path_id: String,
    pub transition_path_hide: bool,
}

impl Default for LayerProperty {
    fn default() -> Self {
        Self {
            clip: true,
            reference_element_id: String::new(),
            reference_element_hide: true,
            transition_timing_function: TimingFunction::Linear,
            transition_relative_zoom: 0.0,
            transition_path_id: String::new(),
            transition_path_hide: true,
        }
    }
}

#[derive(Debug)]
pub struct Frame {
    frame_id: String,
    owner: PresentationId,
    title: String,
    timeout_ms: u64,
    timeout_enable: bool,
    transition_duration_ms: u64,
    show_in_frame_list: bool,
    /// One entry per layer, aligned with `Presentation::layers` at creation.
    camera_states: Vec<CameraState>,
    /// One entry per layer, aligned with `camera_states`.
    layer_properties: Vec<LayerProperty>,
    observers: Observers,
}

impl Frame {
    /// Creates a frame for the current layers of `pres`.
    ///
    /// The frame gets a fresh id, one camera state captured from the
    /// document per layer, and one default `LayerProperty` per layer. The
    /// frame is not added to the presentation.
    pub fn init(pres: &mut Presentation) -> Self {
        let frame_id = pres.make_frame_id();
        let layer_count = pres.layers().len();
        let camera = CameraState::from_document(pres.document());
        let defaults = &pres.config().frame;

        debug!(%frame_id, layers = layer_count, "frame created");
        Self {
            frame_id,
            owner: pres.id(),
            title: defaults.title.clone(),
            timeout_ms: defaults.timeout_ms,
            timeout_enable: defaults.timeout_enable,
            transition_duration_ms: defaults.transition_duration_ms,
            show_in_frame_list: defaults.show_in_frame_list,
            camera_states: vec![camera; layer_count],
            layer_properties: vec![pres.config().layer.clone(); layer_count],
            observers: Observers::new(),
        }
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    /// Position of this frame in `owner.frames()`, recomputed on every call.
    ///
    /// A frame that is not in the list, including one created by another
    /// presentation, is `Detached`.
    pub fn index(&self, owner: &Presentation) -> Result<usize> {
        if self.owner != owner.id() {
            return Err(DeckError::Detached);
        }
        owner
            .frames()
            .iter()
            .position(|frame| std::ptr::eq(frame, self))
            .ok_or(DeckError::Detached)
    }

    /// Token of the presentation this frame was created for.
    pub fn owner(&self) -> PresentationId {
        self.owner
    }

    pub fn camera_states(&self) -> &[CameraState] {
        &self.camera_states
    }

    pub fn layer_properties(&self) -> &[LayerProperty] {
        &self.layer_properties
    }

    /// Number of layers this frame carries state for.
    pub fn layer_count(&self) -> usize {
        self.camera_states.len()
    }

    pub fn camera_state(&self, layer: usize) -> Result<&CameraState> {
        let len = self.camera_states.len();
        self.camera_states
            .get(layer)
            .ok_or(DeckError::LayerOutOfRange { index: layer, len })
    }

    pub fn camera_state_mut(&mut self, layer: usize) -> Result<&mut CameraState> {
        let len = self.camera_states.len();
        self.camera_states
            .get_mut(layer)
            .ok_or(DeckError::LayerOutOfRange { index: layer, len })
    }

    pub fn layer_property(&self, layer: usize) -> Result<&LayerProperty> {
        let len = self.layer_properties.len();
        self.layer_properties
            .get(layer)
            .ok_or(DeckError::LayerOutOfRange { index: layer, len })
    }

    pub fn layer_property_mut(&mut self, layer: usize) -> Result<&mut LayerProperty> {
        let len = self.layer_properties.len();
        self.layer_properties
            .get_mut(layer)
            .ok_or(DeckError::LayerOutOfRange { index: layer, len })
    }

    /// Copies the geometry of `states[i]` into camera state `i`.
    ///
    /// `states` must have one entry per layer; on a length mismatch nothing
    /// is copied.
    pub fn set_camera_states(&mut self, states: &[CameraState]) -> Result<()> {
        if states.len() != self.camera_states.len() {
            warn!(
                frame_id = %self.frame_id,
                expected = self.camera_states.len(),
                actual = states.len(),
                "rejected camera states"
            );
            return Err(DeckError::LengthMismatch {
                expected: self.camera_states.len(),
                actual: states.len(),
            });
        }
        for (target, source) in self.camera_states.iter_mut().zip(states) {
            target.set_at_state(source);
        }
        self.observers.emit("cameraStates");
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if self.title != title {
            self.title = title;
            self.observers.emit("title");
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn set_timeout_ms(&mut self, timeout_ms: u64) {
        if self.timeout_ms != timeout_ms {
            self.timeout_ms = timeout_ms;
            self.observers.emit("timeoutMs");
        }
    }

    pub fn timeout_enable(&self) -> bool {
        self.timeout_enable
    }

    pub fn set_timeout_enable(&mut self, enable: bool) {
        if self.timeout_enable != enable {
            self.timeout_enable = enable;
            self.observers.emit("timeoutEnable");
        }
    }

    pub fn transition_duration_ms(&self) -> u64 {
        self.transition_duration_ms
    }

    pub fn set_transition_duration_ms(&mut self, duration_ms: u64) {
        if self.transition_duration_ms != duration_ms {
            self.transition_duration_ms = duration_ms;
            self.observers.emit("transitionDurationMs");
        }
    }

    pub fn show_in_frame_list(&self) -> bool {
        self.show_in_frame_list
    }

    pub fn set_show_in_frame_list(&mut self, show: bool) {
        if self.show_in_frame_list != show {
            self.show_in_frame_list = show;
            self.observers.emit("showInFrameList");
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}
