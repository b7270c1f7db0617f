//! `amp-accordion`.
//!
//! Each section is rendered twice, once expanded and once collapsed, so that
//! state-dependent selectors match whichever state the page starts in.

use super::stub_subtree;
use crate::dom::StaticDom;
use indextree::NodeId;

const HEADER_CLASS: &str = "i-amphtml-accordion-header";
const CONTENT_CLASS: &str = "i-amphtml-accordion-content";

fn mark_section(dom: &mut StaticDom, section: NodeId, expanded: bool) {
    if expanded {
        dom.set_attr(section, "expanded", "");
    } else {
        dom.remove_attr(section, "expanded");
    }
    let parts = dom.element_children(section);
    if let Some(&header) = parts.first() {
        dom.add_class(header, HEADER_CLASS);
        dom.set_attr(header, "role", "button");
        dom.set_attr(header, "tabindex", "0");
        dom.set_attr(header, "aria-expanded", if expanded { "true" } else { "false" });
    }
    if let Some(&content) = parts.get(1) {
        dom.add_class(content, CONTENT_CLASS);
        dom.set_attr(content, "role", "region");
    }
}

fn is_marked(dom: &StaticDom, section: NodeId) -> bool {
    dom.element_children(section)
        .first()
        .is_some_and(|header| dom.has_class(*header, HEADER_CLASS))
}

pub fn stub_accordion(dom: &mut StaticDom, id: NodeId) {
    let sections = dom.children_by_tag(id, "section");
    if sections.iter().any(|section| is_marked(dom, *section)) {
        return;
    }
    for section in sections {
        let Some(copy) = dom.clone_subtree(section) else {
            continue;
        };
        mark_section(dom, section, true);
        mark_section(dom, copy, false);
        dom.insert_after(section, copy);
        stub_subtree(dom, copy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};

    #[test]
    fn sections_are_doubled_in_order() -> Result<()> {
        let mut dom = StaticDom::parse(
            "<amp-accordion><section expanded><h2>a</h2><p>1</p></section>\
             <section><h2>b</h2><p>2</p></section></amp-accordion>",
        )?;
        let id = dom
            .elements_by_tag("amp-accordion")
            .first()
            .copied()
            .ok_or_else(|| anyhow!("no accordion"))?;
        stub_accordion(&mut dom, id);
        let sections = dom.children_by_tag(id, "section");
        let states: Vec<(String, bool)> = sections
            .iter()
            .map(|section| (dom.text_content(*section), dom.has_attr(*section, "expanded")))
            .collect();
        assert_eq!(
            states,
            vec![
                ("a1".to_owned(), true),
                ("a1".to_owned(), false),
                ("b2".to_owned(), true),
                ("b2".to_owned(), false),
            ]
        );
        let content = dom.elements_by_tag("p");
        assert!(content.iter().all(|part| dom.has_class(*part, CONTENT_CLASS)));
        stub_accordion(&mut dom, id);
        assert_eq!(dom.children_by_tag(id, "section").len(), 4);
        Ok(())
    }
}
