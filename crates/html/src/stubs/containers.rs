//! Wrapper-only components: `amp-layout`, `amp-fit-text` and `amp-image-lightbox`.

use super::{has_child_with_class, layout::is_size_defined};
use crate::dom::StaticDom;
use indextree::NodeId;

/// `amp-layout` with a size-defined layout wraps its children in a fill box.
pub fn stub_layout_container(dom: &mut StaticDom, id: NodeId) {
    let sized = dom
        .attr(id, "layout")
        .is_some_and(|layout| is_size_defined(&layout.trim().to_ascii_lowercase()));
    if !sized || has_child_with_class(dom, id, "i-amphtml-fill-content") {
        return;
    }
    let wrapper = dom.create_element("div", &[("class", "i-amphtml-fill-content")]);
    dom.wrap_children(id, wrapper);
}

pub fn stub_fit_text(dom: &mut StaticDom, id: NodeId) {
    if has_child_with_class(dom, id, "i-amphtml-fit-text-content") {
        return;
    }
    let content = dom.create_element("div", &[("class", "i-amphtml-fit-text-content")]);
    let inner = dom.create_element("div", &[("class", "i-amphtml-fit-text-content-inner")]);
    for child in dom.children(id) {
        dom.append_child(inner, child);
    }
    dom.append_child(content, inner);
    dom.append_child(id, content);
}

/// `amp-image-lightbox` viewer chrome.
pub fn stub_image_lightbox(dom: &mut StaticDom, id: NodeId) {
    if has_child_with_class(dom, id, "i-amphtml-image-lightbox-container") {
        return;
    }
    let caption_id = dom
        .attr(id, "id")
        .map_or_else(|| "amp-image-lightbox-caption".to_owned(), |lightbox| format!("{lightbox}-caption"));

    let container = dom.create_element("div", &[("class", "i-amphtml-image-lightbox-container")]);
    let viewer = dom.create_element("div", &[("class", "i-amphtml-image-lightbox-viewer")]);
    let image = dom.create_element(
        "img",
        &[("class", "i-amphtml-image-lightbox-viewer-image"), ("src", "")],
    );
    dom.append_child(viewer, image);
    dom.append_child(container, viewer);

    let caption = dom.create_element(
        "div",
        &[
            ("class", "i-amphtml-image-lightbox-caption amp-image-lightbox-caption"),
            ("id", &caption_id),
        ],
    );
    dom.append_child(container, caption);

    let close = dom.create_element(
        "button",
        &[("class", "i-amphtml-screen-reader"), ("aria-label", "Close the lightbox")],
    );
    dom.append_child(id, container);
    dom.append_child(id, close);
}
