use core::fmt::{self, Write as _};

use super::{DOMNode, NodeKind, StaticDom};
use crate::tags::{is_raw_text, is_void};
use indextree::NodeId;

// -----------------------
// Module-scope helpers
// -----------------------

fn escape_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

fn write_attrs(out: &mut String, attrs: &[(String, String)]) {
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        // `attr=""` is written as a bare attribute.
        if !value.is_empty() {
            out.push_str("=\"");
            escape_attr(out, value);
            out.push('"');
        }
    }
}

impl StaticDom {
    /// Serialize the document back to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in self.children(self.root) {
            self.write_node(&mut out, child, false);
        }
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId, raw_parent: bool) {
        let Some(DOMNode { kind, attrs }) = self.node(id) else {
            return;
        };
        match kind {
            NodeKind::Document => {
                for child in self.children(id) {
                    self.write_node(out, child, false);
                }
            }
            NodeKind::Doctype { name } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeKind::Comment { text } => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Text { text } => {
                if raw_parent {
                    out.push_str(text);
                } else {
                    escape_text(out, text);
                }
            }
            NodeKind::Element { tag } => {
                out.push('<');
                out.push_str(tag);
                write_attrs(out, attrs);
                out.push('>');
                if is_void(tag) {
                    return;
                }
                let raw = is_raw_text(tag);
                for child in self.children(id) {
                    self.write_node(out, child, raw);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

impl fmt::Debug for StaticDom {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_indent(fmt: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
            for _ in 0..depth {
                fmt.write_str("  ")?;
            }
            Ok(())
        }

        fn fmt_node(
            dom: &StaticDom,
            id: NodeId,
            fmt: &mut fmt::Formatter<'_>,
            depth: usize,
        ) -> fmt::Result {
            let Some(DOMNode { kind, attrs }) = dom.node(id) else {
                return Ok(());
            };
            match kind {
                NodeKind::Document => {
                    writeln!(fmt, "#document")?;
                }
                NodeKind::Doctype { name } => {
                    write_indent(fmt, depth)?;
                    writeln!(fmt, "<!DOCTYPE {name}>")?;
                }
                NodeKind::Element { tag } => {
                    write_indent(fmt, depth)?;
                    let mut open = String::new();
                    write_attrs(&mut open, attrs);
                    writeln!(fmt, "<{tag}{open}>")?;
                }
                NodeKind::Text { text } => {
                    // Skip pure-whitespace text nodes in the printer for cleaner output
                    if text.chars().all(char::is_whitespace) {
                        return Ok(());
                    }
                    write_indent(fmt, depth)?;
                    writeln!(fmt, "{text:?}")?;
                }
                NodeKind::Comment { text } => {
                    write_indent(fmt, depth)?;
                    writeln!(fmt, "<!--{text}-->")?;
                }
            }
            for child in dom.children(id) {
                fmt_node(dom, child, fmt, depth + 1)?;
            }
            Ok(())
        }

        fmt_node(self, self.root, fmt, 0)
    }
}

/// Render a compact outline of the element structure, used in logs and test failures.
pub fn outline(dom: &StaticDom, id: NodeId) -> String {
    let mut out = String::new();
    for element in dom.elements_under(id) {
        if let Some(tag) = dom.tag(element) {
            let _ignore = write!(out, "{tag}");
            if let Some(class) = dom.attr(element, "class") {
                let _ignore = write!(out, ".{}", class.split_ascii_whitespace().collect::<Vec<_>>().join("."));
            }
            out.push(' ');
        }
    }
    out.trim_end().to_owned()
}
