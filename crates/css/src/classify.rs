//! Bucketing of every selector in a stylesheet by how its usage is decided.

use crate::selector::{
    has_escape, has_stateful_pseudo, is_amp_element, is_polyfill, split_pseudo,
    split_selector_list,
};
use crate::types::{AtRule, AtRuleBody, CssNode, Stylesheet, is_conditional_group};
use std::collections::HashSet;

/// A selector together with the strategy used to decide whether it is used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassifiedSelector {
    /// Plain selector, decided by `count(selector)`.
    Simple(String),
    /// Bare `amp-*` tag selector, decided against the stubbed static DOM.
    AmpElement(String),
    /// Selector with a stateful pseudo, decided by `count(base)`.
    Pseudo {
        /// Text before the first pseudo colon.
        base: String,
        /// The pseudo part, starting with `:`.
        modifier: String,
    },
    /// Selector with escapes, decided by literal class/id matching.
    EscapedPseudo(String),
    /// Vendor-prefixed pseudo, always kept.
    Polyfill(String),
    /// Rule with several comma-separated branches, kept if any branch is used.
    CommaGroup {
        /// Full selector list as written in the rule.
        text: String,
        /// Individual branches.
        branches: Vec<String>,
        /// Whether some branch matched.
        is_used: bool,
    },
    /// An `@keyframes` block, kept while an animation references it.
    Keyframe {
        /// Animation name.
        name: String,
        /// Whether a surviving declaration references it.
        is_used: bool,
    },
}

/// Category names, also used as report keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SelectorCategory {
    /// Rules with an empty block.
    Empty,
    /// See [`ClassifiedSelector::Simple`].
    General,
    /// See [`ClassifiedSelector::AmpElement`].
    AmpElement,
    /// See [`ClassifiedSelector::Pseudo`].
    Pseudo,
    /// See [`ClassifiedSelector::EscapedPseudo`].
    EscapedPseudo,
    /// See [`ClassifiedSelector::Polyfill`].
    Polyfill,
    /// See [`ClassifiedSelector::CommaGroup`].
    CommaGroup,
    /// See [`ClassifiedSelector::Keyframe`].
    Keyframes,
}

impl SelectorCategory {
    /// Key under which removals of this category are reported.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "emptySelectors",
            Self::General => "general",
            Self::AmpElement => "ampElement",
            Self::Pseudo => "pseudo",
            Self::EscapedPseudo => "escapedPseudo",
            Self::Polyfill => "polyfill",
            Self::CommaGroup => "commaGroup",
            Self::Keyframes => "keyframes",
        }
    }
}

impl ClassifiedSelector {
    /// Category of this selector.
    pub const fn category(&self) -> SelectorCategory {
        match self {
            Self::Simple(_) => SelectorCategory::General,
            Self::AmpElement(_) => SelectorCategory::AmpElement,
            Self::Pseudo { .. } => SelectorCategory::Pseudo,
            Self::EscapedPseudo(_) => SelectorCategory::EscapedPseudo,
            Self::Polyfill(_) => SelectorCategory::Polyfill,
            Self::CommaGroup { .. } => SelectorCategory::CommaGroup,
            Self::Keyframe { .. } => SelectorCategory::Keyframes,
        }
    }

    /// Selector text of the rule this entry governs, or `@keyframes name`.
    pub fn text(&self) -> String {
        match self {
            Self::Simple(text)
            | Self::AmpElement(text)
            | Self::EscapedPseudo(text)
            | Self::Polyfill(text)
            | Self::CommaGroup { text, .. } => text.clone(),
            Self::Pseudo { base, modifier } => format!("{base}{modifier}"),
            Self::Keyframe { name, .. } => format!("@keyframes {name}"),
        }
    }
}

/// How the classifier treats an at-rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AtRuleHandling {
    /// Leave untouched.
    Ignore,
    /// Walk the nested rules like top-level ones.
    Recurse,
    /// Record the block as a [`ClassifiedSelector::Keyframe`].
    Keyframes,
}

/// Fixed at-rule table.
pub fn at_rule_handling(at_rule: &AtRule) -> AtRuleHandling {
    if at_rule.is_keyframes() {
        return AtRuleHandling::Keyframes;
    }
    if matches!(at_rule.body, AtRuleBody::Rules(_)) && is_conditional_group(&at_rule.name) {
        AtRuleHandling::Recurse
    } else {
        AtRuleHandling::Ignore
    }
}

/// Classify a single selector list.
///
/// Precedence: comma group, polyfill, escaped, pseudo, AMP element, general.
pub fn classify_selector(selector: &str) -> ClassifiedSelector {
    let branches = split_selector_list(selector);
    if branches.len() > 1 {
        return ClassifiedSelector::CommaGroup {
            text: selector.to_owned(),
            branches,
            is_used: false,
        };
    }
    if is_polyfill(selector) {
        return ClassifiedSelector::Polyfill(selector.to_owned());
    }
    if has_escape(selector) {
        return ClassifiedSelector::EscapedPseudo(selector.to_owned());
    }
    if has_stateful_pseudo(selector)
        && let Some((base, modifier)) = split_pseudo(selector)
    {
        return ClassifiedSelector::Pseudo { base, modifier };
    }
    if is_amp_element(selector) {
        return ClassifiedSelector::AmpElement(selector.to_owned());
    }
    ClassifiedSelector::Simple(selector.to_owned())
}

/// Classified selectors of one stylesheet, in first-seen order without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassifiedSelectors {
    selectors: Vec<ClassifiedSelector>,
}

impl ClassifiedSelectors {
    /// All entries in first-seen order.
    pub fn all(&self) -> &[ClassifiedSelector] {
        &self.selectors
    }

    /// Entries of one category.
    pub fn of(&self, category: SelectorCategory) -> impl Iterator<Item = &ClassifiedSelector> {
        self.selectors
            .iter()
            .filter(move |selector| selector.category() == category)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Whether nothing was classified.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

struct Classifier {
    seen: HashSet<String>,
    out: Vec<ClassifiedSelector>,
}

impl Classifier {
    fn push(&mut self, classified: ClassifiedSelector) {
        if self.seen.insert(classified.text()) {
            self.out.push(classified);
        }
    }

    fn walk(&mut self, nodes: &[CssNode]) {
        for node in nodes {
            match node {
                CssNode::Style(rule) => self.push(classify_selector(&rule.selector)),
                CssNode::At(at_rule) => match at_rule_handling(at_rule) {
                    AtRuleHandling::Recurse => {
                        if let AtRuleBody::Rules(children) = &at_rule.body {
                            self.walk(children);
                        }
                    }
                    AtRuleHandling::Keyframes => self.push(ClassifiedSelector::Keyframe {
                        name: at_rule.keyframes_name().to_owned(),
                        is_used: false,
                    }),
                    AtRuleHandling::Ignore => {}
                },
            }
        }
    }
}

/// Bucket every selector of `sheet`. Pure: the sheet is not modified.
pub fn classify(sheet: &Stylesheet) -> ClassifiedSelectors {
    let mut classifier = Classifier {
        seen: HashSet::new(),
        out: Vec::new(),
    };
    classifier.walk(&sheet.nodes);
    ClassifiedSelectors {
        selectors: classifier.out,
    }
}
