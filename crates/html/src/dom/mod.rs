//! Arena-backed static DOM.
//!
//! The tree is mutated in place by the runtime stubs and printed back to HTML
//! by [`printing`]. Node ids stay valid when a node is moved, so callers may
//! snapshot ids before mutating.

pub mod printing;
pub mod updating;

use indextree::{Arena, Node, NodeId};
use std::collections::BTreeSet;

/// Kind of a DOM node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Document,
    Doctype { name: String },
    Element { tag: String },
    Text { text: String },
    Comment { text: String },
}

/// Payload stored in every arena node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMNode {
    pub kind: NodeKind,
    /// Attributes in source order; names are lowercased by the HTML parser.
    pub attrs: Vec<(String, String)>,
}

impl DOMNode {
    /// Create an element payload.
    pub fn element(tag: &str, attrs: &[(&str, &str)]) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_owned(),
            },
            attrs: attrs
                .iter()
                .map(|&(name, value)| (name.to_owned(), value.to_owned()))
                .collect(),
        }
    }

    /// Create a text payload.
    pub fn text(text: &str) -> Self {
        Self {
            kind: NodeKind::Text {
                text: text.to_owned(),
            },
            attrs: Vec::new(),
        }
    }
}

/// Attribute marking the platform boilerplate style block.
pub const BOILERPLATE_ATTR: &str = "amp-boilerplate";
/// Attribute marking the keyframes polyfill style block.
pub const KEYFRAMES_ATTR: &str = "amp-keyframes";

/// A parsed, mutable HTML document.
#[derive(Clone)]
pub struct StaticDom {
    dom: Arena<DOMNode>,
    root: NodeId,
}

impl Default for StaticDom {
    fn default() -> Self {
        let mut dom = Arena::new();
        let root = dom.new_node(DOMNode::default());
        Self { dom, root }
    }
}

impl StaticDom {
    /// The document node.
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Payload of `id`, if the id belongs to this arena and was not removed.
    pub fn node(&self, id: NodeId) -> Option<&DOMNode> {
        self.dom.get(id).filter(|node| !node.is_removed()).map(Node::get)
    }

    /// Tag name of an element node.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }

    /// Value of attribute `name` on `id`.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?
            .attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether `id` carries attribute `name`.
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Whether `id` has `class` among its class tokens.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|token| token == class))
    }

    /// Children of `id`, in order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        id.children(&self.dom).collect()
    }

    /// Element children of `id`, in order.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        id.children(&self.dom)
            .filter(|child| self.tag(*child).is_some())
            .collect()
    }

    /// Element children of `id` with tag `tag`.
    pub fn children_by_tag(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        id.children(&self.dom)
            .filter(|child| self.tag(*child) == Some(tag))
            .collect()
    }

    /// Parent of `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        id.parent(&self.dom)
    }

    /// `id` and all of its element descendants in document order.
    pub fn elements_under(&self, id: NodeId) -> Vec<NodeId> {
        id.descendants(&self.dom)
            .filter(|node| self.tag(*node).is_some())
            .collect()
    }

    /// Every element attached to the document, in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.elements_under(self.root)
    }

    /// Whether `id` is still reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.node(id).is_some() && id.ancestors(&self.dom).any(|ancestor| ancestor == self.root)
    }

    /// Elements with tag `tag` in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|id| self.tag(*id) == Some(tag))
            .collect()
    }

    /// First element whose `id` attribute equals `value`.
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|id| self.attr(*id, "id") == Some(value))
    }

    /// Distinct tag names present in the document.
    pub fn tag_names(&self) -> BTreeSet<String> {
        self.elements()
            .into_iter()
            .filter_map(|id| self.tag(id).map(str::to_owned))
            .collect()
    }

    /// Concatenated text of all text descendants of `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        id.descendants(&self.dom)
            .filter_map(|node| match &self.node(node)?.kind {
                NodeKind::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// `<style>` elements that are neither boilerplate nor the keyframes polyfill.
    pub fn custom_style_elements(&self) -> Vec<NodeId> {
        self.elements_by_tag("style")
            .into_iter()
            .filter(|id| !self.has_attr(*id, BOILERPLATE_ATTR) && !self.has_attr(*id, KEYFRAMES_ATTR))
            .collect()
    }

    /// Text of every custom style block, concatenated in document order.
    pub fn custom_style_text(&self) -> String {
        self.custom_style_elements()
            .into_iter()
            .map(|id| self.text_content(id))
            .collect()
    }

    /// Replace custom style contents with `css`.
    ///
    /// The first custom block receives the new text, any further custom blocks
    /// are removed. Returns `false` when the document has no custom block.
    pub fn replace_custom_styles(&mut self, css: &str) -> bool {
        let styles = self.custom_style_elements();
        let Some((&first, rest)) = styles.split_first() else {
            return false;
        };
        self.set_text_content(first, css);
        for &extra in rest {
            self.remove(extra);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};

    const PAGE: &str = "<!doctype html><html amp><head>\
        <style amp-boilerplate>body{visibility:hidden}</style>\
        <style amp-custom>.a{color:red}</style></head>\
        <body><style>.b{color:blue}</style><div id=\"x\" class=\"a  c\">hi</div></body></html>";

    #[test]
    fn custom_styles_skip_boilerplate() -> Result<()> {
        let dom = StaticDom::parse(PAGE)?;
        assert_eq!(dom.custom_style_elements().len(), 2);
        assert_eq!(dom.custom_style_text(), ".a{color:red}.b{color:blue}");
        Ok(())
    }

    #[test]
    fn replacing_custom_styles_keeps_first_block_only() -> Result<()> {
        let mut dom = StaticDom::parse(PAGE)?;
        assert!(dom.replace_custom_styles(".a{color:red}"));
        assert_eq!(dom.custom_style_elements().len(), 1);
        assert_eq!(dom.custom_style_text(), ".a{color:red}");
        let html = dom.to_html();
        assert!(html.contains("<style amp-boilerplate>body{visibility:hidden}</style>"));
        assert!(!html.contains(".b{color:blue}"));
        Ok(())
    }

    #[test]
    fn lookups_by_id_class_and_tag() -> Result<()> {
        let dom = StaticDom::parse(PAGE)?;
        let div = dom.element_by_id("x").ok_or_else(|| anyhow!("missing #x"))?;
        assert_eq!(dom.tag(div), Some("div"));
        assert!(dom.has_class(div, "c"));
        assert!(!dom.has_class(div, "a  c"));
        assert_eq!(dom.text_content(div), "hi");
        assert!(dom.tag_names().contains("style"));
        Ok(())
    }
}
