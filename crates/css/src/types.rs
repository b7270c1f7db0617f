//! Mutable CSS rule tree.
//!
//! The tree keeps selectors, at-rule preludes and declaration values as raw
//! (whitespace-collapsed) text so that serializing and re-parsing a sheet is
//! stable. Only conditional group at-rules hold nested rule lists; every other
//! at-rule block is kept verbatim, and so are nested rules inside a style
//! rule body.

use core::fmt;

/// A single CSS declaration (property: value [!important]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub name: String,
    /// Raw value text (without trailing !important).
    pub value: String,
    /// Whether the declaration was marked as `!important`.
    pub important: bool,
}

/// One entry of a style rule block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleItem {
    /// A parsed declaration.
    Declaration(Declaration),
    /// Nested rule, nested at-rule or unparsable declaration, kept as written.
    Verbatim(String),
}

/// A style rule: selector list text plus its block entries in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRule {
    /// Raw selector list, e.g. `.a, .b:hover`.
    pub selector: String,
    /// Block contents.
    pub items: Vec<RuleItem>,
}

impl StyleRule {
    /// Parsed declarations of the block, skipping verbatim entries.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.items.iter().filter_map(|item| match item {
            RuleItem::Declaration(decl) => Some(decl),
            RuleItem::Verbatim(_) => None,
        })
    }

    /// Whether the block holds nothing at all.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Body of an at-rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AtRuleBody {
    /// Statement at-rule such as `@import url(a.css);`.
    Statement,
    /// Conditional group whose children are walked like top-level rules.
    Rules(Vec<CssNode>),
    /// Any other block, kept as written (`@font-face`, `@keyframes`, ...).
    Raw(String),
}

/// An at-rule with its lowercased name and raw prelude.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtRule {
    /// Name without the leading `@`, lowercased.
    pub name: String,
    /// Prelude text between the name and the block.
    pub params: String,
    /// Block contents.
    pub body: AtRuleBody,
}

impl AtRule {
    /// Whether this is an `@keyframes` block, vendor prefixed or not.
    pub fn is_keyframes(&self) -> bool {
        is_keyframes_name(&self.name)
    }

    /// Animation name declared by a keyframes prelude, with quotes stripped.
    pub fn keyframes_name(&self) -> &str {
        self.params.trim().trim_matches(|ch| ch == '"' || ch == '\'')
    }
}

/// One node of the rule tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CssNode {
    /// A qualified style rule.
    Style(StyleRule),
    /// An at-rule.
    At(AtRule),
}

/// A parsed stylesheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Top-level nodes in source order.
    pub nodes: Vec<CssNode>,
}

/// Whether an at-rule name introduces a conditional group whose block holds rules.
pub fn is_conditional_group(name: &str) -> bool {
    matches!(
        name,
        "media" | "supports" | "document" | "-moz-document" | "container" | "layer" | "scope"
    )
}

/// Whether an at-rule name is `keyframes` or a vendor-prefixed variant of it.
pub fn is_keyframes_name(name: &str) -> bool {
    name == "keyframes" || (name.starts_with('-') && name.ends_with("-keyframes"))
}

fn walk_nodes<'sheet>(nodes: &'sheet [CssNode], visit: &mut impl FnMut(&'sheet StyleRule)) {
    for node in nodes {
        match node {
            CssNode::Style(rule) => visit(rule),
            CssNode::At(AtRule {
                body: AtRuleBody::Rules(children),
                ..
            }) => walk_nodes(children, visit),
            CssNode::At(_) => {}
        }
    }
}

fn retain_nodes(nodes: &mut Vec<CssNode>, remove: &mut impl FnMut(&CssNode) -> bool) -> Vec<CssNode> {
    let mut removed = Vec::new();
    let mut kept = Vec::with_capacity(nodes.len());
    for mut node in nodes.drain(..) {
        if remove(&node) {
            removed.push(node);
            continue;
        }
        if let CssNode::At(AtRule {
            body: AtRuleBody::Rules(children),
            ..
        }) = &mut node
        {
            removed.extend(retain_nodes(children, remove));
        }
        kept.push(node);
    }
    *nodes = kept;
    removed
}

fn prune_groups(nodes: &mut Vec<CssNode>) -> usize {
    let mut pruned = 0;
    for node in nodes.iter_mut() {
        if let CssNode::At(AtRule {
            body: AtRuleBody::Rules(children),
            ..
        }) = node
        {
            pruned += prune_groups(children);
        }
    }
    let before = nodes.len();
    nodes.retain(|node| {
        !matches!(
            node,
            CssNode::At(AtRule { body: AtRuleBody::Rules(children), .. }) if children.is_empty()
        )
    });
    pruned + (before - nodes.len())
}

impl Stylesheet {
    /// Visit every style rule, descending into conditional groups.
    pub fn for_each_rule<'sheet>(&'sheet self, mut visit: impl FnMut(&'sheet StyleRule)) {
        walk_nodes(&self.nodes, &mut visit);
    }

    /// Collect references to every style rule, in source order.
    pub fn style_rules(&self) -> Vec<&StyleRule> {
        let mut rules = Vec::new();
        self.for_each_rule(|rule| rules.push(rule));
        rules
    }

    /// Remove every style rule matching `remove`, at any depth.
    ///
    /// Returns the removed rules in source order.
    pub fn remove_rules_where(
        &mut self,
        mut remove: impl FnMut(&StyleRule) -> bool,
    ) -> Vec<StyleRule> {
        retain_nodes(&mut self.nodes, &mut |node| {
            matches!(node, CssNode::Style(rule) if remove(rule))
        })
        .into_iter()
        .filter_map(|node| match node {
            CssNode::Style(rule) => Some(rule),
            CssNode::At(_) => None,
        })
        .collect()
    }

    /// Remove every style rule whose selector text equals `selector`.
    ///
    /// Returns how many rules were removed; removing an absent selector is a no-op.
    pub fn remove_selector(&mut self, selector: &str) -> usize {
        self.remove_rules_where(|rule| rule.selector == selector).len()
    }

    /// Remove style rules with an empty block, returning their selectors.
    pub fn remove_empty_rules(&mut self) -> Vec<String> {
        self.remove_rules_where(StyleRule::is_empty)
            .into_iter()
            .map(|rule| rule.selector)
            .collect()
    }

    /// Remove every keyframes block (any vendor prefix, any depth) declaring `name`.
    pub fn remove_keyframes(&mut self, name: &str) -> usize {
        retain_nodes(&mut self.nodes, &mut |node| {
            matches!(node, CssNode::At(at_rule) if at_rule.is_keyframes() && at_rule.keyframes_name() == name)
        })
        .len()
    }

    /// Drop conditional groups that no longer hold any rule.
    pub fn prune_empty_groups(&mut self) -> usize {
        prune_groups(&mut self.nodes)
    }

    /// Whether any surviving `animation*` declaration references `name` as a whole token.
    pub fn references_animation(&self, name: &str) -> bool {
        let mut found = false;
        self.for_each_rule(|rule| {
            found = found
                || rule.declarations().any(|decl| {
                    decl.name.contains("animation")
                        && decl
                            .value
                            .split(|ch: char| ch.is_whitespace() || ch == ',')
                            .any(|token| token.trim_matches(|ch| ch == '"' || ch == '\'') == name)
                });
        });
        found
    }

    /// Serialize the tree to compact CSS text.
    pub fn to_css(&self) -> String {
        self.to_string()
    }

    /// Whether the sheet has no nodes left.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.important {
            write!(fmt, "{}:{}!important", self.name, self.value)
        } else {
            write!(fmt, "{}:{}", self.name, self.value)
        }
    }
}

impl fmt::Display for StyleRule {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}{{", self.selector)?;
        for (idx, item) in self.items.iter().enumerate() {
            if idx > 0 {
                fmt.write_str(";")?;
            }
            match item {
                RuleItem::Declaration(decl) => write!(fmt, "{decl}")?,
                RuleItem::Verbatim(text) => fmt.write_str(text)?,
            }
        }
        fmt.write_str("}")
    }
}

impl fmt::Display for AtRule {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "@{}", self.name)?;
        if !self.params.is_empty() {
            write!(fmt, " {}", self.params)?;
        }
        match &self.body {
            AtRuleBody::Statement => fmt.write_str(";"),
            AtRuleBody::Rules(children) => {
                fmt.write_str("{")?;
                for child in children {
                    write!(fmt, "{child}")?;
                }
                fmt.write_str("}")
            }
            AtRuleBody::Raw(raw) => write!(fmt, "{{{raw}}}"),
        }
    }
}

impl fmt::Display for CssNode {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Style(rule) => write!(fmt, "{rule}"),
            Self::At(at_rule) => write!(fmt, "{at_rule}"),
        }
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(fmt, "{node}")?;
        }
        Ok(())
    }
}
