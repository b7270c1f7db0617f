//! `layout` attribute handling shared by every AMP element.

use super::has_child_with_class;
use crate::dom::StaticDom;
use indextree::NodeId;

/// Layouts whose box size is known before the runtime loads.
const SIZE_DEFINED: &[&str] = &[
    "fill",
    "fixed",
    "fixed-height",
    "flex-item",
    "fluid",
    "intrinsic",
    "responsive",
];

const SIZER_TAG: &str = "i-amphtml-sizer";

/// Whether `layout` yields a size-defined box.
pub fn is_size_defined(layout: &str) -> bool {
    SIZE_DEFINED.contains(&layout)
}

fn dimension(dom: &StaticDom, id: NodeId, name: &str) -> Option<f64> {
    dom.attr(id, name)?
        .trim()
        .trim_end_matches("px")
        .parse::<f64>()
        .ok()
        .filter(|value| *value > 0.0)
}

fn has_sizer(dom: &StaticDom, id: NodeId) -> bool {
    dom.element_children(id)
        .into_iter()
        .any(|child| dom.tag(child) == Some(SIZER_TAG))
}

fn responsive_sizer(dom: &mut StaticDom, id: NodeId) -> NodeId {
    let style = match (dimension(dom, id, "width"), dimension(dom, id, "height")) {
        (Some(width), Some(height)) => format!("display:block;padding-top:{}%", height / width * 100.0),
        _ => "display:block".to_owned(),
    };
    dom.create_element(SIZER_TAG, &[("class", "i-amphtml-sizer"), ("style", &style)])
}

fn intrinsic_sizer(dom: &mut StaticDom, id: NodeId) -> NodeId {
    let width = dimension(dom, id, "width").unwrap_or_default();
    let height = dimension(dom, id, "height").unwrap_or_default();
    let src = format!(
        "data:image/svg+xml;charset=utf-8,<svg height=\"{height}\" width=\"{width}\" \
         xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\"/>"
    );
    let sizer = dom.create_element(SIZER_TAG, &[("class", "i-amphtml-sizer")]);
    let image = dom.create_element(
        "img",
        &[
            ("alt", ""),
            ("aria-hidden", "true"),
            ("class", "i-amphtml-intrinsic-sizer"),
            ("role", "presentation"),
            ("src", &src),
        ],
    );
    dom.append_child(sizer, image);
    sizer
}

/// Apply the classes and sizer the runtime adds for the element's `layout`.
pub fn stub_layout(dom: &mut StaticDom, id: NodeId) {
    let Some(layout) = dom
        .attr(id, "layout")
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
    else {
        return;
    };
    dom.add_class(id, "i-amphtml-element");
    dom.add_class(id, &format!("i-amphtml-layout-{layout}"));
    if is_size_defined(&layout) {
        dom.add_class(id, "i-amphtml-layout-size-defined");
    }
    if has_sizer(dom, id) || has_child_with_class(dom, id, "i-amphtml-sizer") {
        return;
    }
    let sizer = match layout.as_str() {
        "responsive" => responsive_sizer(dom, id),
        "intrinsic" => intrinsic_sizer(dom, id),
        _ => return,
    };
    dom.prepend_child(id, sizer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::printing::outline;
    use anyhow::{Result, anyhow};

    fn stub_first(html: &str, tag: &str) -> Result<(StaticDom, NodeId)> {
        let mut dom = StaticDom::parse(html)?;
        let id = dom
            .elements_by_tag(tag)
            .first()
            .copied()
            .ok_or_else(|| anyhow!("no <{tag}>"))?;
        stub_layout(&mut dom, id);
        Ok((dom, id))
    }

    #[test]
    fn layout_classes() -> Result<()> {
        let cases = [
            ("fixed", "i-amphtml-element i-amphtml-layout-fixed i-amphtml-layout-size-defined"),
            ("nodisplay", "i-amphtml-element i-amphtml-layout-nodisplay"),
            ("container", "i-amphtml-element i-amphtml-layout-container"),
            ("FLEX-ITEM", "i-amphtml-element i-amphtml-layout-flex-item i-amphtml-layout-size-defined"),
        ];
        for (layout, expected) in cases {
            let (dom, id) = stub_first(&format!("<amp-x layout=\"{layout}\"></amp-x>"), "amp-x")?;
            assert_eq!(dom.attr(id, "class"), Some(expected), "layout {layout}");
        }
        Ok(())
    }

    #[test]
    fn responsive_gets_padded_sizer() -> Result<()> {
        let (dom, id) = stub_first("<amp-img layout=responsive width=400 height=225></amp-img>", "amp-img")?;
        let sizer = dom.element_children(id)[0];
        assert_eq!(dom.tag(sizer), Some(SIZER_TAG));
        assert_eq!(dom.attr(sizer, "class"), Some("i-amphtml-sizer"));
        assert_eq!(dom.attr(sizer, "style"), Some("display:block;padding-top:56.25%"));
        Ok(())
    }

    #[test]
    fn intrinsic_gets_image_sizer() -> Result<()> {
        let (dom, id) = stub_first("<amp-img layout=intrinsic width=10 height=5><b></b></amp-img>", "amp-img")?;
        assert_eq!(
            outline(&dom, id),
            "amp-img.i-amphtml-element.i-amphtml-layout-intrinsic.i-amphtml-layout-size-defined \
             i-amphtml-sizer.i-amphtml-sizer img.i-amphtml-intrinsic-sizer b"
        );
        Ok(())
    }

    #[test]
    fn empty_layout_is_ignored() -> Result<()> {
        let (dom, id) = stub_first("<amp-x layout=\" \"></amp-x>", "amp-x")?;
        assert_eq!(dom.attr(id, "class"), None);
        Ok(())
    }
}
