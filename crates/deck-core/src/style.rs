//! Inline style and presentation-attribute resolution.
//!
//! Only what the model needs: reading and writing single declarations of a
//! `style` attribute, and the computed `visibility` of a node.

use crate::document::Document;
use crate::error::Result;
use crate::types::NodeId;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Visible => "visible",
            Visibility::Hidden => "hidden",
            Visibility::Collapse => "collapse",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visible" => Ok(Visibility::Visible),
            "hidden" => Ok(Visibility::Hidden),
            "collapse" => Ok(Visibility::Collapse),
            _ => Err(()),
        }
    }
}

/// Splits a `style` attribute into `(property, value)` pairs.
///
/// Empty declarations and declarations without a colon are skipped.
pub fn parse_declarations(style: &str) -> Vec<(&str, &str)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name, value.trim()))
        })
        .collect()
}

/// Returns the last declared value of `property`.
pub fn get_property<'a>(style: &'a str, property: &str) -> Option<&'a str> {
    parse_declarations(style)
        .into_iter()
        .rev()
        .find(|(name, _)| name.eq_ignore_ascii_case(property))
        .map(|(_, value)| value)
}

/// Returns `style` with `property` set to `value`, replacing earlier declarations.
pub fn set_property(style: &str, property: &str, value: &str) -> String {
    let mut decls: Vec<String> = parse_declarations(style)
        .into_iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case(property))
        .map(|(name, value)| format!("{name}:{value}"))
        .collect();
    decls.push(format!("{property}:{value}"));
    decls.join(";")
}

/// Specified (non-inherited) visibility of one element.
///
/// `None` means "not specified" or `inherit`. The inline style wins over the
/// presentation attribute. Unrecognized values count as not specified.
fn specified_visibility(doc: &Document, id: NodeId) -> Option<Visibility> {
    let from_style = doc
        .attribute(id, "style")
        .and_then(|style| get_property(style, "visibility"));
    let raw = from_style.or_else(|| doc.attribute(id, "visibility"))?;
    raw.parse().ok()
}

/// Computed visibility of a node: its own specified value, else the
/// parent's computed value, else `visible`.
///
/// Text and comment nodes take their parent's value.
pub fn computed_visibility(doc: &Document, id: NodeId) -> Visibility {
    let mut current = Some(id);
    while let Some(node_id) = current {
        if let Some(v) = specified_visibility(doc, node_id) {
            return v;
        }
        current = doc.parent(node_id);
    }
    Visibility::Visible
}

/// Writes `visibility` into the inline style of an element.
pub fn set_visibility(doc: &mut Document, id: NodeId, visibility: Visibility) -> Result<()> {
    let style = doc.attribute(id, "style").unwrap_or_default();
    let updated = set_property(style, "visibility", visibility.as_str());
    doc.set_attribute(id, "style", updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::QName;

    #[test]
    fn declarations_skip_garbage() {
        let decls = parse_declarations("fill: red;;stroke:none; junk ; :x");
        assert_eq!(decls, vec![("fill", "red"), ("stroke", "none")]);
    }

    #[test]
    fn set_property_replaces_existing_value() {
        let style = set_property("fill:red;visibility:hidden", "visibility", "visible");
        assert_eq!(style, "fill:red;visibility:visible");
        assert_eq!(get_property(&style, "VISIBILITY"), Some("visible"));
    }

    #[test]
    fn inline_style_beats_attribute_and_inherits() {
        let mut doc = Document::with_svg_root();
        let root = doc.root().unwrap();
        let g = doc.create_element(QName::svg("g"));
        let rect = doc.create_element(QName::svg("rect"));
        doc.append_child(root, g).unwrap();
        doc.append_child(g, rect).unwrap();

        assert_eq!(computed_visibility(&doc, rect), Visibility::Visible);

        doc.set_attribute(g, "visibility", "hidden").unwrap();
        assert_eq!(computed_visibility(&doc, rect), Visibility::Hidden);

        doc.set_attribute(rect, "style", "visibility:inherit").unwrap();
        assert_eq!(computed_visibility(&doc, rect), Visibility::Hidden);

        set_visibility(&mut doc, g, Visibility::Visible).unwrap();
        assert_eq!(computed_visibility(&doc, g), Visibility::Visible);
        assert_eq!(computed_visibility(&doc, rect), Visibility::Visible);
    }
}
