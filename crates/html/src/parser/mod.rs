//! HTML5 parsing using html5ever, converted into the arena DOM.

use crate::dom::{DOMNode, NodeKind, StaticDom};
use anyhow::{Context as _, Result};
use html5ever::tendril::TendrilSink as _;
use html5ever::{Attribute, ParseOpts, parse_document};
use indextree::NodeId;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// Qualified attribute name as written, keeping namespace prefixes like `xlink:href`.
fn attribute_name(attr: &Attribute) -> String {
    match &attr.name.prefix {
        Some(prefix) => format!("{prefix}:{}", attr.name.local),
        None => attr.name.local.to_string(),
    }
}

impl StaticDom {
    /// Parse a complete HTML document.
    ///
    /// # Errors
    /// Returns an error if the parser could not consume the input.
    pub fn parse(html: &str) -> Result<Self> {
        let rc_dom: RcDom = parse_document(RcDom::default(), ParseOpts::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .context("failed to parse HTML document")?;
        let mut dom = Self::default();
        let root = dom.root();
        for child in rc_dom.document.children.borrow().iter() {
            dom.convert_node(child, root);
        }
        Ok(dom)
    }

    /// Convert an html5ever node to our arena representation under `parent`.
    fn convert_node(&mut self, rc_node: &Handle, parent: NodeId) {
        let payload = match &rc_node.data {
            RcNodeData::Document => {
                for child in rc_node.children.borrow().iter() {
                    self.convert_node(child, parent);
                }
                return;
            }
            RcNodeData::ProcessingInstruction { .. } => return,
            RcNodeData::Doctype { name, .. } => DOMNode {
                kind: NodeKind::Doctype {
                    name: name.to_string(),
                },
                attrs: Vec::new(),
            },
            RcNodeData::Text { contents } => DOMNode::text(&contents.borrow()),
            RcNodeData::Comment { contents } => DOMNode {
                kind: NodeKind::Comment {
                    text: contents.to_string(),
                },
                attrs: Vec::new(),
            },
            RcNodeData::Element { name, attrs, .. } => DOMNode {
                kind: NodeKind::Element {
                    tag: name.local.to_string(),
                },
                attrs: attrs
                    .borrow()
                    .iter()
                    .map(|attr| (attribute_name(attr), attr.value.to_string()))
                    .collect(),
            },
        };
        let node = self.create(payload);
        self.append_child(parent, node);

        if let RcNodeData::Element {
            template_contents, ..
        } = &rc_node.data
            && let Some(contents) = template_contents.borrow().as_ref()
        {
            for child in contents.children.borrow().iter() {
                self.convert_node(child, node);
            }
        }
        for child in rc_node.children.borrow().iter() {
            self.convert_node(child, node);
        }
    }
}
