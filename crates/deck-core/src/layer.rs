//! # Layer
//!
//! A named group of document nodes sharing one visibility switch.

use crate::document::Document;
use crate::error::{DeckError, Result};
use crate::observe::{ChangeEvent, Observers, SubscriptionId};
use crate::presentation::Presentation;
use crate::style::{self, Visibility};
use crate::types::{LayerId, NodeId, PresentationId};
use tracing::warn;

#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    owner: PresentationId,
    label: String,
    auto: bool,
    /// Owned document nodes, in document order.
    nodes: Vec<NodeId>,
    observers: Observers,
}

impl Layer {
    pub(crate) fn new(
        id: LayerId,
        owner: PresentationId,
        label: impl Into<String>,
        auto: bool,
    ) -> Self {
        Self {
            id,
            owner,
            label: label.into(),
            auto,
            nodes: Vec::new(),
            observers: Observers::new(),
        }
    }

    pub(crate) fn push_node(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// True for the catch-all layer holding wrapper groups.
    pub fn is_auto(&self) -> bool {
        self.auto
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Position of this layer in `owner.layers()`.
    ///
    /// Only the layer object itself matches; an equal-looking layer of
    /// another presentation is `Detached`.
    pub fn index(&self, owner: &Presentation) -> Result<usize> {
        if self.owner != owner.id() {
            return Err(DeckError::Detached);
        }
        owner
            .layers()
            .iter()
            .position(|layer| std::ptr::eq(layer, self))
            .ok_or(DeckError::Detached)
    }

    /// True if at least one owned node currently renders as visible.
    pub fn is_visible(&self, doc: &Document) -> bool {
        self.nodes
            .iter()
            .any(|&node| style::computed_visibility(doc, node) == Visibility::Visible)
    }

    /// Shows or hides every owned node, then emits `change:isVisible`.
    pub fn set_visible(&mut self, doc: &mut Document, visible: bool) {
        let visibility = if visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        for &node in &self.nodes {
            if let Err(err) = style::set_visibility(doc, node, visibility) {
                warn!(layer = %self.label, node, %err, "owned node is gone from the document");
            }
        }
        self.observers.emit("isVisible");
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::QName;
    use std::cell::Cell;
    use std::rc::Rc;

    fn layer_with_nodes(count: usize) -> (Document, Layer) {
        let mut doc = Document::with_svg_root();
        let root = doc.root().unwrap();
        let mut layer = Layer::new(LayerId(1), PresentationId::next(), "#a", false);
        for _ in 0..count {
            let g = doc.create_element(QName::svg("g"));
            doc.append_child(root, g).unwrap();
            layer.push_node(g);
        }
        (doc, layer)
    }

    #[test]
    fn visibility_round_trip() {
        let (mut doc, mut layer) = layer_with_nodes(2);
        assert!(layer.is_visible(&doc));

        layer.set_visible(&mut doc, false);
        assert!(!layer.is_visible(&doc));

        layer.set_visible(&mut doc, true);
        assert!(layer.is_visible(&doc));
    }

    #[test]
    fn any_visible_node_makes_layer_visible() {
        let (mut doc, mut layer) = layer_with_nodes(2);
        layer.set_visible(&mut doc, false);

        doc.set_attribute(layer.nodes()[1], "style", "visibility:visible").unwrap();

        assert!(layer.is_visible(&doc));
    }

    #[test]
    fn set_visible_notifies_even_without_nodes() {
        let (mut doc, mut layer) = layer_with_nodes(0);
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        layer.subscribe(move |e| {
            assert_eq!(e.to_string(), "change:isVisible");
            f.set(f.get() + 1);
        });

        layer.set_visible(&mut doc, false);

        assert_eq!(fired.get(), 1);
        assert!(!layer.is_visible(&doc));
    }
}
