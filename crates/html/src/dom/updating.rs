//! In-place mutations of the static DOM.
//!
//! Every operation is total: misuse at the arena level (for example inserting
//! a node under its own descendant) is logged and skipped.

use super::{DOMNode, StaticDom};
use indextree::{NodeError, NodeId};

fn report(result: Result<(), NodeError>, operation: &str) {
    if let Err(err) = result {
        log::warn!("static DOM {operation} skipped: {err}");
    }
}

impl StaticDom {
    /// Whether placing `node` under `anchor` (or next to it) would make `node` its own ancestor.
    fn would_cycle(&self, anchor: NodeId, node: NodeId) -> bool {
        let cycles = anchor.ancestors(&self.dom).any(|ancestor| ancestor == node);
        if cycles {
            log::warn!("static DOM move skipped: node would become its own descendant");
        }
        cycles
    }

    /// Allocate a detached node.
    pub fn create(&mut self, node: DOMNode) -> NodeId {
        self.dom.new_node(node)
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        self.create(DOMNode::element(tag, attrs))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.would_cycle(parent, child) {
            return;
        }
        child.detach(&mut self.dom);
        report(parent.checked_append(child, &mut self.dom), "append");
    }

    /// Insert `child` as the first child of `parent`, detaching it first.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        if self.would_cycle(parent, child) {
            return;
        }
        child.detach(&mut self.dom);
        report(parent.checked_prepend(child, &mut self.dom), "prepend");
    }

    /// Insert `node` right after `sibling`.
    pub fn insert_after(&mut self, sibling: NodeId, node: NodeId) {
        if self.would_cycle(sibling, node) {
            return;
        }
        node.detach(&mut self.dom);
        report(sibling.checked_insert_after(node, &mut self.dom), "insert after");
    }

    /// Remove `id` and its subtree from the document.
    pub fn remove(&mut self, id: NodeId) {
        if self.node(id).is_some() {
            id.remove_subtree(&mut self.dom);
        }
    }

    /// Set attribute `name`, replacing any previous value.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(node) = self.dom.get_mut(id) else {
            return;
        };
        let attrs = &mut node.get_mut().attrs;
        if let Some(slot) = attrs.iter_mut().find(|(key, _)| key == name) {
            value.clone_into(&mut slot.1);
        } else {
            attrs.push((name.to_owned(), value.to_owned()));
        }
    }

    /// Remove attribute `name` if present.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.dom.get_mut(id) {
            node.get_mut().attrs.retain(|(key, _)| key != name);
        }
    }

    /// Add `class` to the class list of `id` unless already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let classes = match self.attr(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_owned(),
        };
        self.set_attr(id, "class", &classes);
    }

    /// Replace every child of `id` with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        for child in self.children(id) {
            child.remove_subtree(&mut self.dom);
        }
        let text_node = self.create(DOMNode::text(text));
        self.append_child(id, text_node);
    }

    /// Deep-copy the subtree rooted at `id`; the copy is detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> Option<NodeId> {
        let payload = self.node(id)?.clone();
        let copy = self.create(payload);
        for child in self.children(id) {
            if let Some(child_copy) = self.clone_subtree(child) {
                report(copy.checked_append(child_copy, &mut self.dom), "append clone");
            }
        }
        Some(copy)
    }

    /// Move every child of `parent` into `wrapper`, then append `wrapper` to `parent`.
    pub fn wrap_children(&mut self, parent: NodeId, wrapper: NodeId) {
        for child in self.children(parent) {
            self.append_child(wrapper, child);
        }
        self.append_child(parent, wrapper);
    }
}
