//! `amp-sidebar`: the backdrop mask and toolbar copies.

use super::{has_child_with_class, stub_subtree};
use crate::dom::StaticDom;
use indextree::NodeId;

const MASK_CLASS: &str = "i-amphtml-sidebar-mask";
const TOOLBAR_CLASS: &str = "i-amphtml-toolbar";

fn has_mask(dom: &StaticDom, id: NodeId) -> bool {
    dom.parent(id)
        .is_some_and(|parent| has_child_with_class(dom, parent, MASK_CLASS))
}

/// Copy `nav[toolbar-target]` children into their target elements.
fn copy_toolbars(dom: &mut StaticDom, id: NodeId) {
    for nav in dom.children_by_tag(id, "nav") {
        let Some(target_id) = dom.attr(nav, "toolbar-target").map(str::to_owned) else {
            continue;
        };
        let Some(target) = dom.element_by_id(&target_id) else {
            log::debug!("toolbar target #{target_id} not found");
            continue;
        };
        if has_child_with_class(dom, target, TOOLBAR_CLASS) {
            continue;
        }
        let Some(copy) = dom.clone_subtree(nav) else {
            continue;
        };
        dom.add_class(copy, TOOLBAR_CLASS);
        dom.append_child(target, copy);
        stub_subtree(dom, copy);
    }
}

pub fn stub_sidebar(dom: &mut StaticDom, id: NodeId) {
    copy_toolbars(dom, id);
    if !has_mask(dom, id) {
        let mask = dom.create_element("div", &[("class", MASK_CLASS)]);
        dom.insert_after(id, mask);
    }
}
