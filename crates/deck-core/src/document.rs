//! # Document Module
//!
//! Arena-based storage for the markup tree a presentation is built on.
//!
//! ## Responsibilities
//! - **Node Storage**: `Vec<Option<DocumentNode>>` arena with `NodeId` indices.
//! - **Hierarchy**: Parent-child relationships via `children` and `parent`.
//! - **Child List Editing**: Append, insert-before and remove, with cycle prevention.
//! - **I/O**: Parse SVG text (via `usvg::roxmltree`) and write it back as XML.
//!
//! ## Key Types
//! - `Document`: The arena container plus the root handle.
//! - `DocumentNode`: Wraps a `NodeKind` with hierarchy data.
//! - `NodeId`: A `usize` index into the arena (defined in `types.rs`).

use crate::error::{DeckError, Result};
use crate::types::NodeId;
use std::fmt::Write as _;
use usvg::roxmltree;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const INKSCAPE_NS: &str = "http://www.inkscape.org/namespaces/inkscape";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// A possibly namespaced element or attribute name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QName {
    pub namespace: Option<String>,
    /// Prefix used when writing the document back out.
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            prefix: None,
            local: local.into(),
        }
    }

    pub fn svg(local: impl Into<String>) -> Self {
        Self {
            namespace: Some(SVG_NS.to_string()),
            prefix: None,
            local: local.into(),
        }
    }

    fn write_to(&self, out: &mut String) {
        if let Some(prefix) = &self.prefix {
            out.push_str(prefix);
            out.push(':');
        }
        out.push_str(&self.local);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// A namespace declaration carried by an element (`xmlns` / `xmlns:prefix`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    pub namespaces: Vec<NamespaceDecl>,
}

impl Element {
    /// Returns the value of an attribute with no namespace.
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace.is_none() && a.name.local == local)
            .map(|a| a.value.as_str())
    }

    pub fn attribute_ns(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace.as_deref() == Some(namespace) && a.name.local == local)
            .map(|a| a.value.as_str())
    }

    /// Sets (or replaces) an attribute with no namespace.
    pub fn set_attribute(&mut self, local: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(attr) = self
            .attributes
            .iter_mut()
            .find(|a| a.name.namespace.is_none() && a.name.local == local)
        {
            attr.value = value;
        } else {
            self.attributes.push(Attribute {
                name: QName::local(local),
                value,
            });
        }
    }
}

/// The payload of a document node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    Comment(String),
}

/// A node plus its position in the hierarchy.
#[derive(Clone, Debug)]
pub struct DocumentNode {
    pub kind: NodeKind,
    /// Indices of child nodes, in document order.
    pub children: Vec<NodeId>,
    /// Index of parent node.
    pub parent: Option<NodeId>,
}

impl DocumentNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match &mut self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// The document tree.
///
/// Detached nodes (created but not yet inserted, or removed from their
/// parent) stay in the arena until `destroy_node` frees them.
#[derive(Clone, Debug, Default)]
pub struct Document {
    /// The arena of all nodes. `None` marks a freed slot.
    pub nodes: Vec<Option<DocumentNode>>,
    /// Indices of freed slots available for reuse.
    pub free_indices: Vec<usize>,
    root: Option<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document whose root is an empty `<svg>` element.
    pub fn with_svg_root() -> Self {
        let mut doc = Self::new();
        let root = doc.create_element(QName::svg("svg"));
        if let Some(element) = doc.element_mut(root) {
            element.namespaces.push(NamespaceDecl {
                prefix: None,
                uri: SVG_NS.to_string(),
            });
        }
        doc.root = Some(root);
        doc
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) -> Result<()> {
        if self.element(root).is_none() {
            return Err(DeckError::InvalidRoot(root));
        }
        self.root = Some(root);
        Ok(())
    }

    fn add_node(&mut self, kind: NodeKind) -> NodeId {
        if let Some(id) = self.free_indices.pop() {
            self.nodes[id] = Some(DocumentNode::new(kind));
            id
        } else {
            let id = self.nodes.len();
            self.nodes.push(Some(DocumentNode::new(kind)));
            id
        }
    }

    /// Creates a detached element with no attributes.
    pub fn create_element(&mut self, name: QName) -> NodeId {
        self.add_node(NodeKind::Element(Element {
            name,
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.add_node(NodeKind::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.add_node(NodeKind::Comment(text.into()))
    }

    /// Recursively destroys a node and its children, freeing their indices for reuse.
    pub fn destroy_node(&mut self, id: NodeId) {
        let Some(node) = self.get_node(id) else {
            return;
        };
        let (parent_id, children_ids) = (node.parent, node.children.clone());

        if let Some(pid) = parent_id {
            self.detach(pid, id);
        }
        for child_id in children_ids {
            self.destroy_node(child_id);
        }

        self.nodes[id] = None;
        self.free_indices.push(id);
        if self.root == Some(id) {
            self.root = None;
        }
    }

    pub fn get_node(&self, id: NodeId) -> Option<&DocumentNode> {
        self.nodes.get(id).and_then(|n| n.as_ref())
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut DocumentNode> {
        self.nodes.get_mut(id).and_then(|n| n.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get_node(id).is_some()
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.get_node(id).and_then(DocumentNode::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.get_node_mut(id).and_then(DocumentNode::as_element_mut)
    }

    /// Local name of an element node, `None` for text, comments and freed ids.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.local.as_str())
    }

    pub fn attribute(&self, id: NodeId, local: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attribute(local))
    }

    pub fn attribute_ns(&self, id: NodeId, namespace: &str, local: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attribute_ns(namespace, local))
    }

    pub fn set_attribute(&mut self, id: NodeId, local: &str, value: impl Into<String>) -> Result<()> {
        let element = self.element_mut(id).ok_or(DeckError::NodeNotFound(id))?;
        element.set_attribute(local, value);
        Ok(())
    }

    /// Child list of a node. Freed ids have no children.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get_node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.parent)
    }

    /// Position of `child` in its parent's child list.
    pub fn child_position(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_attach(parent, child)?;
        self.detach_from_parent(child);
        let p_node = self.get_node_mut(parent).ok_or(DeckError::NodeNotFound(parent))?;
        p_node.children.push(child);
        self.set_parent(child, parent)
    }

    /// Inserts `child` immediately before `reference` in `parent`'s child list.
    ///
    /// `reference` must be a child of `parent` and must not be `child` itself.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> Result<()> {
        if child == reference || self.parent(reference) != Some(parent) {
            return Err(DeckError::InvalidHierarchy { parent, child });
        }
        self.check_attach(parent, child)?;
        self.detach_from_parent(child);
        let pos = self
            .child_position(parent, reference)
            .ok_or(DeckError::InvalidHierarchy { parent, child })?;
        let p_node = self.get_node_mut(parent).ok_or(DeckError::NodeNotFound(parent))?;
        p_node.children.insert(pos, child);
        self.set_parent(child, parent)
    }

    /// Removes `child` from `parent`. The node stays in the arena, detached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.parent(child) != Some(parent) {
            return Err(DeckError::InvalidHierarchy { parent, child });
        }
        self.detach(parent, child);
        Ok(())
    }

    fn check_attach(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if parent == child {
            return Err(DeckError::InvalidHierarchy { parent, child });
        }
        if self.element(parent).is_none() {
            return Err(DeckError::NodeNotFound(parent));
        }
        if !self.contains(child) {
            return Err(DeckError::NodeNotFound(child));
        }

        // `child` must not be an ancestor of `parent`.
        let mut current = Some(parent);
        while let Some(node_id) = current {
            if node_id == child {
                return Err(DeckError::InvalidHierarchy { parent, child });
            }
            current = self.parent(node_id);
        }
        Ok(())
    }

    fn detach_from_parent(&mut self, child: NodeId) {
        if let Some(old_parent) = self.parent(child) {
            self.detach(old_parent, child);
        }
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(p_node) = self.get_node_mut(parent) {
            if let Some(pos) = p_node.children.iter().position(|&x| x == child) {
                p_node.children.remove(pos);
            }
        }
        if let Some(c_node) = self.get_node_mut(child) {
            if c_node.parent == Some(parent) {
                c_node.parent = None;
            }
        }
    }

    fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        let c_node = self.get_node_mut(child).ok_or(DeckError::NodeNotFound(child))?;
        c_node.parent = Some(parent);
        Ok(())
    }

    /// Parses SVG (or any XML) text into a document.
    ///
    /// Processing instructions and the doctype are dropped; elements, text
    /// and comments are kept in document order.
    pub fn parse_svg(text: &str) -> Result<Self> {
        let xml = roxmltree::Document::parse(text).map_err(|e| DeckError::Parse(e.to_string()))?;
        let mut doc = Self::new();
        let root = doc.import_element(xml.root_element(), None);
        doc.root = Some(root);
        Ok(doc)
    }

    fn import_element(&mut self, node: roxmltree::Node<'_, '_>, parent: Option<roxmltree::Node<'_, '_>>) -> NodeId {
        let tag = node.tag_name();
        let name = QName {
            namespace: tag.namespace().map(str::to_string),
            prefix: tag.namespace().and_then(|ns| prefix_for(node, ns)),
            local: tag.name().to_string(),
        };

        let attributes = node
            .attributes()
            .map(|attr| Attribute {
                name: QName {
                    namespace: attr.namespace().map(str::to_string),
                    prefix: attr.namespace().and_then(|ns| prefix_for(node, ns)),
                    local: attr.name().to_string(),
                },
                value: attr.value().to_string(),
            })
            .collect();

        // Only declarations introduced by this element, not the inherited scope.
        let namespaces = node
            .namespaces()
            .filter(|ns| ns.uri() != XML_NS)
            .filter(|ns| {
                parent.map_or(true, |p| {
                    !p.namespaces().any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
                })
            })
            .map(|ns| NamespaceDecl {
                prefix: ns.name().map(str::to_string),
                uri: ns.uri().to_string(),
            })
            .collect();

        let id = self.add_node(NodeKind::Element(Element {
            name,
            attributes,
            namespaces,
        }));

        for child in node.children() {
            let child_id = if child.is_element() {
                Some(self.import_element(child, Some(node)))
            } else if child.is_text() {
                Some(self.create_text(child.text().unwrap_or_default()))
            } else if child.is_comment() {
                Some(self.create_comment(child.text().unwrap_or_default()))
            } else {
                None
            };
            if let Some(child_id) = child_id {
                if let Some(p_node) = self.get_node_mut(id) {
                    p_node.children.push(child_id);
                }
                if let Some(c_node) = self.get_node_mut(child_id) {
                    c_node.parent = Some(id);
                }
            }
        }
        id
    }

    /// Serializes the tree below the root as XML text.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root {
            self.write_node(root, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get_node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => push_escaped(out, text, false),
            NodeKind::Comment(text) => {
                let _ = write!(out, "<!--{text}-->");
            }
            NodeKind::Element(element) => {
                out.push('<');
                element.name.write_to(out);
                for ns in &element.namespaces {
                    match &ns.prefix {
                        Some(prefix) => {
                            let _ = write!(out, " xmlns:{prefix}=\"");
                        }
                        None => out.push_str(" xmlns=\""),
                    }
                    push_escaped(out, &ns.uri, true);
                    out.push('"');
                }
                for attr in &element.attributes {
                    out.push(' ');
                    attr.name.write_to(out);
                    out.push_str("=\"");
                    push_escaped(out, &attr.value, true);
                    out.push('"');
                }
                if node.children.is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for &child in &node.children {
                        self.write_node(child, out);
                    }
                    out.push_str("</");
                    element.name.write_to(out);
                    out.push('>');
                }
            }
        }
    }
}

fn prefix_for(node: roxmltree::Node<'_, '_>, namespace: &str) -> Option<String> {
    if namespace == XML_NS {
        return Some("xml".to_string());
    }
    node.lookup_prefix(namespace)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

fn push_escaped(out: &mut String, text: &str, in_attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
