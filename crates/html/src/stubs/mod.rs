//! Runtime-DOM simulator.
//!
//! AMP components inject markup when the runtime boots. Each registry entry
//! approximates one component's injection on the static DOM so that selectors
//! targeting injected nodes find something to match. Components whose output is
//! data or script dependent are flagged `runtime_dependent`; a document holding
//! any of them has to be checked in a real browser.

mod accordion;
mod carousel;
mod containers;
pub mod layout;
mod list;
mod media;
mod sidebar;

use crate::dom::StaticDom;
use indextree::NodeId;
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};

/// Mutation applied to one element.
pub type StubFn = fn(&mut StaticDom, NodeId);

/// Registry entry for one AMP component.
#[derive(Clone, Copy, Debug)]
pub struct Stub {
    /// DOM injection to apply, if any.
    pub mutate: Option<StubFn>,
    /// Whether the component's output depends on data or scripts.
    pub runtime_dependent: bool,
}

impl Stub {
    /// Component whose injection is simulated.
    const fn mutating(mutate: StubFn) -> Self {
        Self {
            mutate: Some(mutate),
            runtime_dependent: false,
        }
    }

    /// Component with no injection relevant to styling.
    const INERT: Self = Self {
        mutate: None,
        runtime_dependent: false,
    };

    /// Component that cannot be simulated safely and forces a browser check.
    const RUNTIME: Self = Self {
        mutate: None,
        runtime_dependent: true,
    };
}

/// Components that inject nothing relevant to styling.
const INERT_TAGS: &[&str] = &[
    "amp-3d-gltf",
    "amp-3q-player",
    "amp-ad",
    "amp-ad-exit",
    "amp-addthis",
    "amp-analytics",
    "amp-animation",
    "amp-app-banner",
    "amp-auto-ads",
    "amp-brightcove",
    "amp-call-tracking",
    "amp-consent",
    "amp-dailymotion",
    "amp-date-countdown",
    "amp-date-display",
    "amp-embed",
    "amp-facebook",
    "amp-facebook-comments",
    "amp-facebook-like",
    "amp-facebook-page",
    "amp-form",
    "amp-gist",
    "amp-google-document-embed",
    "amp-install-serviceworker",
    "amp-instagram",
    "amp-lightbox",
    "amp-mathml",
    "amp-pixel",
    "amp-position-observer",
    "amp-social-share",
    "amp-soundcloud",
    "amp-sticky-ad",
    "amp-story",
    "amp-timeago",
    "amp-twitter",
    "amp-user-notification",
    "amp-vimeo",
    "amp-vine",
    "amp-youtube",
];

/// Components whose DOM effects are driven by data, scripts or visitor context.
pub const RUNTIME_DEPENDENT_TAGS: &[&str] = &[
    "amp-access",
    "amp-bind-macro",
    "amp-date-picker",
    "amp-experiment",
    "amp-font",
    "amp-geo",
    "amp-list",
    "amp-live-list",
    "amp-script",
    "amp-selector",
    "amp-state",
    "amp-subscriptions",
];

fn build_registry() -> HashMap<&'static str, Stub> {
    let mut registry: HashMap<&'static str, Stub> = HashMap::new();
    for &tag in INERT_TAGS {
        registry.insert(tag, Stub::INERT);
    }
    for &tag in RUNTIME_DEPENDENT_TAGS {
        registry.insert(tag, Stub::RUNTIME);
    }
    registry.insert("amp-img", Stub::mutating(media::stub_image));
    registry.insert("amp-anim", Stub::mutating(media::stub_image));
    registry.insert("amp-video", Stub::mutating(media::stub_video));
    registry.insert("amp-audio", Stub::mutating(media::stub_audio));
    registry.insert("amp-iframe", Stub::mutating(media::stub_iframe));
    registry.insert("amp-carousel", Stub::mutating(carousel::stub_carousel));
    registry.insert("amp-accordion", Stub::mutating(accordion::stub_accordion));
    registry.insert("amp-sidebar", Stub::mutating(sidebar::stub_sidebar));
    registry.insert("amp-layout", Stub::mutating(containers::stub_layout_container));
    registry.insert("amp-fit-text", Stub::mutating(containers::stub_fit_text));
    registry.insert("amp-image-lightbox", Stub::mutating(containers::stub_image_lightbox));
    // Lists are simulated and still go to the browser, since their items come from data.
    for tag in ["amp-list", "amp-live-list"] {
        registry.insert(
            tag,
            Stub {
                mutate: Some(list::stub_list),
                runtime_dependent: true,
            },
        );
    }
    registry
}

static REGISTRY: Lazy<HashMap<&'static str, Stub>> = Lazy::new(build_registry);

/// The tag → stub table.
pub fn registry() -> &'static HashMap<&'static str, Stub> {
    &REGISTRY
}

/// Registry entry for `tag`.
pub fn lookup(tag: &str) -> Option<&'static Stub> {
    REGISTRY.get(tag)
}

/// Whether `tag` forces a document into the browser-backed tier.
pub fn is_exception_tag(tag: &str) -> bool {
    lookup(tag).is_some_and(|stub| stub.runtime_dependent)
}

/// Exception tags present in `dom`.
pub fn exception_tags(dom: &StaticDom) -> BTreeSet<String> {
    dom.tag_names()
        .into_iter()
        .filter(|tag| is_exception_tag(tag))
        .collect()
}

/// Whether `id` already has an element child carrying `class`.
///
/// Stubs check their own marker before injecting, since a subtree can be
/// stubbed again after being cloned.
pub(crate) fn has_child_with_class(dom: &StaticDom, id: NodeId, class: &str) -> bool {
    dom.element_children(id)
        .into_iter()
        .any(|child| dom.has_class(child, class))
}

fn apply_stubs(dom: &mut StaticDom, id: NodeId) {
    let Some(tag) = dom.tag(id).map(str::to_owned) else {
        return;
    };
    if let Some(mutate) = lookup(&tag).and_then(|stub| stub.mutate) {
        log::trace!("stubbing <{tag}>");
        mutate(dom, id);
    }
    if dom.has_attr(id, "layout") {
        layout::stub_layout(dom, id);
    }
}

/// Stub `root` and every element below it, in document order.
///
/// The element list is taken before any mutation, so nodes created along the
/// way are only stubbed when their creator asks for it.
pub fn stub_subtree(dom: &mut StaticDom, root: NodeId) {
    for id in dom.elements_under(root) {
        apply_stubs(dom, id);
    }
}

/// Stub every element of the page.
pub fn stub_page(dom: &mut StaticDom) {
    for id in dom.elements() {
        if dom.is_attached(id) {
            apply_stubs(dom, id);
        }
    }
}
