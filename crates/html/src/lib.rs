//! Static HTML document model for AMP pages.
//!
//! Documents are parsed with html5ever into an arena tree, mutated in place by
//! the runtime stubs in [`stubs`], and printed back with [`StaticDom::to_html`].

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod dom;
pub mod parser;
pub mod stubs;
pub mod tags;

pub use dom::{DOMNode, NodeKind, StaticDom};
