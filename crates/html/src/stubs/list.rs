//! `amp-list` and `amp-live-list`: template items rendered as if data had loaded.

use super::stub_subtree;
use crate::dom::StaticDom;
use indextree::NodeId;

/// Number of rendered copies of the template.
pub const LIST_ITEM_COPIES: usize = 4;

/// Template used by the list: a `template="id"` reference or the first child `<template>`.
fn find_template(dom: &StaticDom, id: NodeId) -> Option<NodeId> {
    if let Some(reference) = dom.attr(id, "template") {
        return dom.element_by_id(reference.trim());
    }
    dom.children_by_tag(id, "template").into_iter().next()
}

fn has_rendered_items(dom: &StaticDom, id: NodeId) -> bool {
    dom.element_children(id)
        .into_iter()
        .any(|child| dom.attr(child, "role") == Some("list"))
}

pub fn stub_list(dom: &mut StaticDom, id: NodeId) {
    if has_rendered_items(dom, id) {
        return;
    }
    let Some(template) = find_template(dom, id) else {
        log::debug!("list without template left unrendered");
        return;
    };
    let items = dom.element_children(template);
    if items.is_empty() {
        return;
    }
    let container = dom.create_element("div", &[("role", "list")]);
    for _ in 0..LIST_ITEM_COPIES {
        for &item in &items {
            let Some(copy) = dom.clone_subtree(item) else {
                continue;
            };
            dom.set_attr(copy, "role", "listitem");
            dom.append_child(container, copy);
            stub_subtree(dom, copy);
        }
    }
    dom.append_child(id, container);
}
