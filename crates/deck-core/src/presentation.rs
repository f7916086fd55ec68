//! # Presentation
//!
//! Top-level aggregate: owns the document, its layers and the frame list.
//!
//! ## Responsibilities
//! - **Partitioning**: Turns the flat children of the document root into layers,
//!   wrapping unclaimed drawable runs into synthetic groups (`init`).
//! - **Frame Ids**: Generates ids that are unique within the presentation.
//! - **Frame List**: Add, insert, remove and reorder frames.
//!
//! Layers are fixed once `init` returns. A frame whose per-layer arrays do
//! not match the layer count is rejected, so the arrays never drift.

use crate::camera::CameraState;
use crate::config::DeckConfig;
use crate::document::{Document, QName, INKSCAPE_NS, SVG_NS};
use crate::error::{DeckError, Result};
use crate::frame::Frame;
use crate::layer::Layer;
use crate::observe::{ChangeEvent, Observers, SubscriptionId};
use crate::types::{LayerId, NodeId, PresentationId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Element names (lower-cased local names) that can belong to a layer.
pub const DRAWABLE_TAGS: &[&str] = &[
    "g", "image", "path", "rect", "circle", "ellipse", "line", "polyline", "polygon", "text",
    "clippath",
];

pub fn is_drawable(local_name: &str) -> bool {
    let name = local_name.to_ascii_lowercase();
    DRAWABLE_TAGS.contains(&name.as_str())
}

#[derive(Debug)]
pub struct Presentation {
    id: PresentationId,
    document: Document,
    root: NodeId,
    layers: Vec<Layer>,
    frames: Vec<Frame>,
    config: DeckConfig,
    rng: StdRng,
    /// Every id handed out by `make_frame_id`, attached or not. Never shrinks.
    issued_frame_ids: HashSet<String>,
    observers: Observers,
}

impl Presentation {
    pub fn init(document: Document) -> Result<Self> {
        Self::init_with_config(document, DeckConfig::default())
    }

    /// Partitions the document root into layers and builds an empty presentation.
    pub fn init_with_config(mut document: Document, config: DeckConfig) -> Result<Self> {
        let root = document.root().ok_or(DeckError::MissingRoot)?;
        if document.element(root).is_none() {
            return Err(DeckError::InvalidRoot(root));
        }

        let id = PresentationId::next();
        let layers = partition(&mut document, root, id)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            id,
            document,
            root,
            layers,
            frames: Vec::new(),
            config,
            rng,
            issued_frame_ids: HashSet::new(),
            observers: Observers::new(),
        })
    }

    /// Token stamped into every layer and frame this presentation creates.
    pub fn id(&self) -> PresentationId {
        self.id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Gives the (partitioned) document back, dropping the model.
    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    // ============ Layers ============

    /// All layers; the auto layer is always first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn auto_layer(&self) -> &Layer {
        &self.layers[0]
    }

    pub fn layer(&self, index: usize) -> Result<&Layer> {
        let len = self.layers.len();
        self.layers
            .get(index)
            .ok_or(DeckError::LayerOutOfRange { index, len })
    }

    pub fn layer_mut(&mut self, index: usize) -> Result<&mut Layer> {
        let len = self.layers.len();
        self.layers
            .get_mut(index)
            .ok_or(DeckError::LayerOutOfRange { index, len })
    }

    pub fn layer_by_id(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id() == id)
    }

    pub fn layer_by_label(&self, label: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.label() == label)
    }

    pub fn is_layer_visible(&self, index: usize) -> Result<bool> {
        Ok(self.layer(index)?.is_visible(&self.document))
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> Result<()> {
        let len = self.layers.len();
        let layer = self
            .layers
            .get_mut(index)
            .ok_or(DeckError::LayerOutOfRange { index, len })?;
        layer.set_visible(&mut self.document, visible);
        Ok(())
    }

    // ============ Frames ============

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Result<&Frame> {
        let len = self.frames.len();
        self.frames
            .get(index)
            .ok_or(DeckError::FrameOutOfRange { index, len })
    }

    pub fn frame_mut(&mut self, index: usize) -> Result<&mut Frame> {
        let len = self.frames.len();
        self.frames
            .get_mut(index)
            .ok_or(DeckError::FrameOutOfRange { index, len })
    }

    pub fn frame_by_id(&self, frame_id: &str) -> Option<&Frame> {
        self.frames.iter().find(|f| f.frame_id() == frame_id)
    }

    /// Generates a frame id not used by any frame of this presentation and
    /// not returned by an earlier call.
    ///
    /// The id is the configured prefix followed by a random number in
    /// `1000..10000`, incremented until it is free. Issued ids stay reserved
    /// for the life of the presentation, even after their frame is removed
    /// or dropped without being added.
    pub fn make_frame_id(&mut self) -> String {
        let seed: u64 = self.rng.gen_range(1000..10000);
        let frame_id = self.next_free_frame_id(seed);
        self.issued_frame_ids.insert(frame_id.clone());
        frame_id
    }

    fn next_free_frame_id(&self, mut suffix: u64) -> String {
        loop {
            let candidate = format!("{}{}", self.config.frame_id_prefix, suffix);
            let taken = self.issued_frame_ids.contains(&candidate)
                || self.frames.iter().any(|f| f.frame_id() == candidate);
            if !taken {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Creates a frame for the current layers and appends it. Returns its index.
    pub fn new_frame(&mut self) -> Result<usize> {
        let frame = Frame::init(self);
        self.add_frame(frame)
    }

    /// Appends `frame`. Returns its index.
    pub fn add_frame(&mut self, frame: Frame) -> Result<usize> {
        let index = self.frames.len();
        self.insert_frame(index, frame)?;
        Ok(index)
    }

    /// Inserts `frame` at `index` (`index == frames().len()` appends).
    pub fn insert_frame(&mut self, index: usize, frame: Frame) -> Result<()> {
        let len = self.frames.len();
        if index > len {
            return Err(DeckError::FrameOutOfRange { index, len });
        }
        self.check_frame(&frame)?;
        debug!(frame_id = frame.frame_id(), index, "frame inserted");
        self.frames.insert(index, frame);
        self.observers.emit("frames");
        Ok(())
    }

    pub fn remove_frame(&mut self, index: usize) -> Result<Frame> {
        let len = self.frames.len();
        if index >= len {
            return Err(DeckError::FrameOutOfRange { index, len });
        }
        let frame = self.frames.remove(index);
        debug!(frame_id = frame.frame_id(), index, "frame removed");
        self.observers.emit("frames");
        Ok(frame)
    }

    /// Moves the frame at `from` so that it ends up at index `to`.
    pub fn move_frame(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.frames.len();
        if from >= len {
            return Err(DeckError::FrameOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(DeckError::FrameOutOfRange { index: to, len });
        }
        if from != to {
            let frame = self.frames.remove(from);
            self.frames.insert(to, frame);
            self.observers.emit("frames");
        }
        Ok(())
    }

    fn check_frame(&self, frame: &Frame) -> Result<()> {
        if frame.owner() != self.id {
            warn!(frame_id = frame.frame_id(), owner = %frame.owner(), "frame from another presentation");
            return Err(DeckError::ForeignFrame(frame.frame_id().to_string()));
        }
        let expected = self.layers.len();
        let actual = frame.layer_count();
        if actual != expected || frame.layer_properties().len() != expected {
            warn!(frame_id = frame.frame_id(), expected, actual, "frame does not match layers");
            return Err(DeckError::LengthMismatch { expected, actual });
        }
        Ok(())
    }

    /// Camera state of the whole document, as a new frame would capture it.
    pub fn document_camera(&self) -> CameraState {
        CameraState::from_document(&self.document)
    }

    /// Subscribes to `change:frames` notifications.
    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

/// Splits the children of `root` into layers.
///
/// Text and comments are destroyed. A `g` with an id no earlier layer has
/// claimed becomes a named layer. Runs of other drawable elements between
/// named layers are moved into fresh wrapper groups owned by the auto layer.
/// Non-drawable elements stay where they are and belong to no layer.
fn partition(document: &mut Document, root: NodeId, owner: PresentationId) -> Result<Vec<Layer>> {
    let mut layers = vec![Layer::new(LayerId(0), owner, "auto", true)];
    let mut claimed_ids: HashSet<String> = HashSet::new();
    let wrapper_name = wrapper_name(document, root);
    let mut wrapper = document.create_element(wrapper_name.clone());
    let mut removed = 0usize;

    // Children are moved while we walk, so iterate over a copy.
    let snapshot = document.children(root).to_vec();

    for node in snapshot {
        let Some(tag) = document.tag_name(node).map(str::to_ascii_lowercase) else {
            document.destroy_node(node);
            removed += 1;
            continue;
        };

        if !DRAWABLE_TAGS.contains(&tag.as_str()) {
            debug!(node, tag = %tag, "left in place");
            continue;
        }

        let layer_id = if tag == "g" {
            document
                .attribute(node, "id")
                .filter(|id| !claimed_ids.contains(*id))
                .map(str::to_string)
        } else {
            None
        };

        let Some(layer_id) = layer_id else {
            document.append_child(wrapper, node)?;
            continue;
        };

        if !document.children(wrapper).is_empty() {
            document.insert_before(root, wrapper, node)?;
            debug!(wrapper, size = document.children(wrapper).len(), "wrapper sealed");
            layers[0].push_node(wrapper);
            wrapper = document.create_element(wrapper_name.clone());
        }

        let label = document
            .attribute_ns(node, INKSCAPE_NS, "label")
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{layer_id}"));
        debug!(node, id = %layer_id, %label, "layer discovered");

        let mut layer = Layer::new(LayerId(layers.len() as u32), owner, label, false);
        layer.push_node(node);
        layers.push(layer);
        claimed_ids.insert(layer_id);
    }

    if document.children(wrapper).is_empty() {
        document.destroy_node(wrapper);
    } else {
        document.append_child(root, wrapper)?;
        debug!(wrapper, size = document.children(wrapper).len(), "wrapper sealed");
        layers[0].push_node(wrapper);
    }

    info!(
        layers = layers.len(),
        wrappers = layers[0].nodes().len(),
        removed,
        "document partitioned"
    );
    Ok(layers)
}

/// Name for wrapper groups: `g` in the SVG namespace, reusing the root's
/// prefix when the root itself is a prefixed SVG element.
fn wrapper_name(document: &Document, root: NodeId) -> QName {
    match document.element(root) {
        Some(element) if element.name.namespace.as_deref() == Some(SVG_NS) => QName {
            namespace: element.name.namespace.clone(),
            prefix: element.name.prefix.clone(),
            local: "g".to_string(),
        },
        _ => QName::svg("g"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(svg: &str) -> Presentation {
        let doc = Document::parse_svg(svg).unwrap();
        Presentation::init_with_config(doc, DeckConfig::default().with_seed(42)).unwrap()
    }

    #[test]
    fn missing_root_is_rejected() {
        assert_eq!(
            Presentation::init(Document::new()).unwrap_err(),
            DeckError::MissingRoot
        );
    }

    #[test]
    fn empty_document_has_only_auto_layer() {
        let pres = seeded(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#);

        assert_eq!(pres.layers().len(), 1);
        assert!(pres.auto_layer().is_auto());
        assert_eq!(pres.auto_layer().label(), "auto");
        assert!(pres.auto_layer().nodes().is_empty());
        assert!(pres.document().children(pres.root()).is_empty());
    }

    #[test]
    fn drawable_tags_match_case_insensitively() {
        assert!(is_drawable("clipPath"));
        assert!(is_drawable("G"));
        assert!(!is_drawable("defs"));
        assert!(!is_drawable("metadata"));
    }

    #[test]
    fn frame_ids_use_prefix_and_four_digits() {
        let mut pres = seeded(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#);
        let id = pres.make_frame_id();
        let suffix: u64 = id.strip_prefix("frame").unwrap().parse().unwrap();
        assert!((1000..10000).contains(&suffix));
    }

    #[test]
    fn frame_id_skips_taken_suffixes() {
        let mut pres = seeded(r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="a"/></svg>"#);
        pres.new_frame().unwrap();
        let taken = pres.frame(0).unwrap().frame_id().to_string();
        let suffix: u64 = taken.strip_prefix("frame").unwrap().parse().unwrap();

        assert_eq!(
            pres.next_free_frame_id(suffix),
            format!("frame{}", suffix + 1)
        );
    }

    #[test]
    fn removed_frame_keeps_its_id_reserved() {
        let mut pres = seeded(r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="a"/></svg>"#);
        pres.new_frame().unwrap();
        let removed = pres.remove_frame(0).unwrap();
        let suffix: u64 = removed.frame_id().strip_prefix("frame").unwrap().parse().unwrap();

        assert!(pres.frames().is_empty());
        assert_eq!(
            pres.next_free_frame_id(suffix),
            format!("frame{}", suffix + 1)
        );
    }

    #[test]
    fn same_seed_gives_same_ids() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#;
        let mut a = seeded(svg);
        let mut b = seeded(svg);
        for _ in 0..5 {
            assert_eq!(a.make_frame_id(), b.make_frame_id());
        }
    }

    #[test]
    fn frame_list_editing_keeps_indices_current() {
        let mut pres = seeded(r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="a"/></svg>"#);
        for _ in 0..3 {
            pres.new_frame().unwrap();
        }
        let ids: Vec<String> = pres.frames().iter().map(|f| f.frame_id().to_string()).collect();

        pres.move_frame(0, 2).unwrap();
        assert_eq!(pres.frame_by_id(&ids[0]).unwrap().index(&pres), Ok(2));
        assert_eq!(pres.frame_by_id(&ids[1]).unwrap().index(&pres), Ok(0));

        let removed = pres.remove_frame(1).unwrap();
        assert_eq!(removed.frame_id(), ids[2]);
        assert_eq!(removed.index(&pres), Err(DeckError::Detached));
        assert_eq!(pres.frame_by_id(&ids[0]).unwrap().index(&pres), Ok(1));

        assert_eq!(
            pres.remove_frame(5).unwrap_err(),
            DeckError::FrameOutOfRange { index: 5, len: 2 }
        );
        assert!(pres.move_frame(0, 2).is_err());
        assert!(pres.frame(2).is_err());
    }

    #[test]
    fn frames_of_other_presentations_are_rejected() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="a"/></svg>"#;
        let mut pres = seeded(svg);
        let mut other = seeded(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#);
        pres.new_frame().unwrap();

        let foreign = Frame::init(&mut other);
        let foreign_id = foreign.frame_id().to_string();
        assert_eq!(
            pres.add_frame(foreign).unwrap_err(),
            DeckError::ForeignFrame(foreign_id)
        );

        // Same seed, same document: the twin's frame matches in shape and id.
        let mut twin = seeded(svg);
        let clash = Frame::init(&mut twin);
        assert_eq!(clash.frame_id(), pres.frame(0).unwrap().frame_id());
        assert!(matches!(
            pres.insert_frame(0, clash),
            Err(DeckError::ForeignFrame(_))
        ));
        assert_eq!(pres.frames().len(), 1);
    }

    #[test]
    fn insert_frame_in_the_middle_shifts_later_frames() {
        let mut pres = seeded(r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="a"/></svg>"#);
        pres.new_frame().unwrap();
        pres.new_frame().unwrap();
        let first = pres.frame(0).unwrap().frame_id().to_string();
        let last = pres.frame(1).unwrap().frame_id().to_string();

        let frame = Frame::init(&mut pres);
        let middle = frame.frame_id().to_string();
        pres.insert_frame(1, frame).unwrap();

        assert_eq!(pres.frames().len(), 3);
        assert_eq!(pres.frame_by_id(&first).unwrap().index(&pres), Ok(0));
        assert_eq!(pres.frame_by_id(&middle).unwrap().index(&pres), Ok(1));
        assert_eq!(pres.frame_by_id(&last).unwrap().index(&pres), Ok(2));
    }

    #[test]
    fn insert_frame_checks_bounds() {
        let mut pres = seeded(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#);
        let frame = Frame::init(&mut pres);
        assert_eq!(
            pres.insert_frame(1, frame).unwrap_err(),
            DeckError::FrameOutOfRange { index: 1, len: 0 }
        );
    }

    #[test]
    fn layer_lookups() {
        let mut pres = seeded(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="a"/><g id="b"/></svg>"#,
        );

        assert_eq!(pres.layer_by_label("#b").unwrap().index(&pres), Ok(2));
        assert_eq!(pres.layer_by_id(LayerId(1)).unwrap().label(), "#a");
        assert_eq!(
            pres.layer(3).unwrap_err(),
            DeckError::LayerOutOfRange { index: 3, len: 3 }
        );
        assert!(pres.set_layer_visible(9, false).is_err());

        pres.set_layer_visible(1, false).unwrap();
        assert_eq!(pres.is_layer_visible(1), Ok(false));
        assert_eq!(pres.is_layer_visible(2), Ok(true));
    }
}
