//! `amp-carousel` in its `slides` and scrollable forms.

use super::has_child_with_class;
use crate::dom::StaticDom;
use indextree::NodeId;

const SLIDES_CONTAINER: &str = "i-amphtml-slides-container";
const SCROLL_CONTAINER: &str = "i-amphtml-scrollable-carousel-container";

/// Children the runtime leaves outside the slide track.
fn is_slide(dom: &StaticDom, id: NodeId) -> bool {
    !dom.has_attr(id, "placeholder") && !dom.has_attr(id, "fallback")
}

fn button(dom: &mut StaticDom, direction: &str, label: &str, disabled: bool) -> NodeId {
    let mut class = format!("amp-carousel-button amp-carousel-button-{direction}");
    if disabled {
        class.push_str(" amp-disabled");
    }
    dom.create_element(
        "div",
        &[
            ("class", &class),
            ("role", "button"),
            ("tabindex", "0"),
            ("aria-label", label),
        ],
    )
}

pub fn stub_carousel(dom: &mut StaticDom, id: NodeId) {
    if has_child_with_class(dom, id, SLIDES_CONTAINER) || has_child_with_class(dom, id, SCROLL_CONTAINER) {
        return;
    }
    let slides = dom.attr(id, "type").is_some_and(|kind| kind.trim() == "slides");
    let looping = dom.has_attr(id, "loop");
    let items: Vec<NodeId> = dom
        .element_children(id)
        .into_iter()
        .filter(|child| is_slide(dom, *child))
        .collect();

    let container = if slides {
        dom.create_element("div", &[("class", SLIDES_CONTAINER), ("aria-live", "polite")])
    } else {
        dom.create_element("div", &[("class", SCROLL_CONTAINER)])
    };
    for item in items {
        dom.add_class(item, "amp-carousel-slide");
        if slides {
            let wrapper = dom.create_element("div", &[("class", "i-amphtml-slide-item")]);
            dom.append_child(wrapper, item);
            dom.append_child(container, wrapper);
        } else {
            dom.append_child(container, item);
        }
    }
    dom.append_child(id, container);

    let prev = button(dom, "prev", "Previous item in carousel", !looping);
    let next = button(dom, "next", "Next item in carousel", false);
    dom.append_child(id, prev);
    dom.append_child(id, next);
}
