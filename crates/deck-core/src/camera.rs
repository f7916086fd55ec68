//! Camera state: the view geometry of one layer in one frame.

use crate::document::Document;
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// View parameters captured for one layer.
///
/// `cx`/`cy` is the center of the viewed region in document units, `angle`
/// is in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
    pub clipped: bool,
}

impl Default for CameraState {
    fn default() -> Self {
        Self::from_bounds(Rect::new(0.0, 0.0, 1.0, 1.0))
    }
}

impl CameraState {
    pub fn from_bounds(bounds: Rect) -> Self {
        let center = bounds.center();
        Self {
            cx: center.x,
            cy: center.y,
            width: bounds.width(),
            height: bounds.height(),
            angle: 0.0,
            clipped: true,
        }
    }

    /// Captures the whole-document view: the root `viewBox`, else its
    /// `width`/`height`, else a unit square.
    pub fn from_document(doc: &Document) -> Self {
        Self::from_bounds(document_bounds(doc).unwrap_or(Rect::new(0.0, 0.0, 1.0, 1.0)))
    }

    /// Copies the geometric parameters of `other`.
    pub fn set_at_state(&mut self, other: &CameraState) {
        self.cx = other.cx;
        self.cy = other.cy;
        self.width = other.width;
        self.height = other.height;
        self.angle = other.angle;
        self.clipped = other.clipped;
    }

    /// Axis-aligned bounds of the view, ignoring `angle`.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size((self.cx, self.cy), (self.width, self.height))
    }
}

fn document_bounds(doc: &Document) -> Option<Rect> {
    let root = doc.root()?;
    if let Some(rect) = doc.attribute(root, "viewBox").and_then(parse_view_box) {
        return Some(rect);
    }
    let width = doc.attribute(root, "width").and_then(parse_length)?;
    let height = doc.attribute(root, "height").and_then(parse_length)?;
    Some(Rect::new(0.0, 0.0, width, height))
}

fn parse_view_box(value: &str) -> Option<Rect> {
    let numbers: Vec<f64> = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse::<f64>)
        .collect::<Result<_, _>>()
        .ok()?;
    match numbers.as_slice() {
        &[x, y, w, h] if w > 0.0 && h > 0.0 => Some(Rect::new(x, y, x + w, y + h)),
        _ => None,
    }
}

/// Absolute length in user units. Percentages are rejected.
fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.ends_with('%') {
        return None;
    }
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+' || c == 'e' || c == 'E'))
        .unwrap_or(value.len());
    let number: f64 = value[..end].parse().ok()?;
    let scale = match value[end..].trim() {
        "" | "px" => 1.0,
        "pt" => 4.0 / 3.0,
        "pc" => 16.0,
        "mm" => 96.0 / 25.4,
        "cm" => 96.0 / 2.54,
        "in" => 96.0,
        _ => return None,
    };
    let length = number * scale;
    (length > 0.0).then_some(length)
}
