//! CSS side of the unused-CSS remover: a mutable rule tree, its parser and
//! serializer, and the classifier that buckets every selector by how its
//! usage is decided.
#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod classify;
pub mod parser;
pub mod selector;
pub mod types;

pub use classify::{ClassifiedSelector, ClassifiedSelectors, SelectorCategory, classify};
pub use parser::{ParsedStylesheet, parse_stylesheet, parse_stylesheet_with_diagnostics};
pub use types::{AtRule, AtRuleBody, CssNode, Declaration, RuleItem, StyleRule, Stylesheet};
