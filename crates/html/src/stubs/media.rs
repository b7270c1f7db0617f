//! Media components: the runtime renders a native element inside the custom one.

use super::has_child_with_class;
use crate::dom::StaticDom;
use indextree::NodeId;

const REPLACED_CLASSES: &str = "i-amphtml-fill-content i-amphtml-replaced-content";

/// Build `tag` with the fill classes plus every attribute of `id` listed in `copied`.
fn replaced_element(dom: &mut StaticDom, id: NodeId, tag: &str, copied: &[&str]) -> NodeId {
    let element = dom.create_element(tag, &[("class", REPLACED_CLASSES)]);
    for name in copied {
        if let Some(value) = dom.attr(id, name).map(str::to_owned) {
            dom.set_attr(element, name, &value);
        }
    }
    element
}

/// Move `<source>` and `<track>` children of `id` into `media`.
fn adopt_sources(dom: &mut StaticDom, id: NodeId, media: NodeId) {
    for child in dom.element_children(id) {
        if matches!(dom.tag(child), Some("source" | "track")) {
            dom.append_child(media, child);
        }
    }
}

/// `amp-img` and `amp-anim`.
pub fn stub_image(dom: &mut StaticDom, id: NodeId) {
    if has_child_with_class(dom, id, "i-amphtml-replaced-content") {
        return;
    }
    let image = replaced_element(dom, id, "img", &["src", "srcset", "sizes", "alt", "title"]);
    dom.set_attr(image, "decoding", "async");
    dom.append_child(id, image);
}

/// `amp-video`.
pub fn stub_video(dom: &mut StaticDom, id: NodeId) {
    if has_child_with_class(dom, id, "i-amphtml-replaced-content") {
        return;
    }
    let video = replaced_element(
        dom,
        id,
        "video",
        &["src", "poster", "controls", "autoplay", "loop", "muted", "playsinline", "preload"],
    );
    adopt_sources(dom, id, video);
    dom.append_child(id, video);
}

/// `amp-audio`.
pub fn stub_audio(dom: &mut StaticDom, id: NodeId) {
    if dom.children_by_tag(id, "audio").into_iter().next().is_some() {
        return;
    }
    let audio = dom.create_element("audio", &[("controls", "")]);
    for name in ["src", "autoplay", "loop", "muted", "preload"] {
        if let Some(value) = dom.attr(id, name).map(str::to_owned) {
            dom.set_attr(audio, name, &value);
        }
    }
    adopt_sources(dom, id, audio);
    dom.append_child(id, audio);
}

/// `amp-iframe`: a scroll container wrapping the real frame.
pub fn stub_iframe(dom: &mut StaticDom, id: NodeId) {
    if dom
        .children_by_tag(id, "i-amphtml-scroll-container")
        .into_iter()
        .next()
        .is_some()
    {
        return;
    }
    let container = dom.create_element("i-amphtml-scroll-container", &[]);
    let frame = dom.create_element("iframe", &[("class", "i-amphtml-fill-content")]);
    for name in ["src", "srcdoc", "frameborder", "allowfullscreen", "sandbox", "scrolling"] {
        if let Some(value) = dom.attr(id, name).map(str::to_owned) {
            dom.set_attr(frame, name, &value);
        }
    }
    dom.append_child(container, frame);
    dom.append_child(id, container);
}
