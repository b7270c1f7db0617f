//! Tiered unused-CSS removal.
//!
//! Tier 0 answers every usage question from the stubbed static DOM. Tier 1 does
//! the empty-rule and `amp-*` passes statically too, then asks a live browser
//! about everything else. A document with runtime-dependent components only gets
//! selector-level checks in tier 1.

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod passes;
pub mod stats;
pub mod whitelist;

pub use passes::Optimizer;
pub use stats::{RemovalStats, RemovedSelectors};
pub use whitelist::{Whitelist, WhitelistError};

use core::error::Error;
use core::fmt;
use css::{ClassifiedSelectors, Stylesheet};
use oracle::PresenceOracle;
use serde::{Deserialize, Serialize};

/// How much work the user allows per document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OptimizationLevel {
    /// Static analysis only.
    #[default]
    Static,
    /// Use a browser for documents the static DOM cannot represent.
    Browser,
    /// Reserved; currently identical to [`OptimizationLevel::Browser`].
    Thorough,
}

/// An optimization level outside `0..=2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidLevel(pub u8);

impl fmt::Display for InvalidLevel {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "optimization level must be 0, 1 or 2, got {}", self.0)
    }
}

impl Error for InvalidLevel {}

impl TryFrom<u8> for OptimizationLevel {
    type Error = InvalidLevel;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Self::Static),
            1 => Ok(Self::Browser),
            2 => Ok(Self::Thorough),
            other => Err(InvalidLevel(other)),
        }
    }
}

impl From<OptimizationLevel> for u8 {
    fn from(level: OptimizationLevel) -> Self {
        match level {
            OptimizationLevel::Static => 0,
            OptimizationLevel::Browser => 1,
            OptimizationLevel::Thorough => 2,
        }
    }
}

/// Optimizer a document is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    Static,
    Browser,
}

impl TryFrom<u8> for Tier {
    type Error = InvalidLevel;

    fn try_from(tier: u8) -> Result<Self, Self::Error> {
        match tier {
            0 => Ok(Self::Static),
            1 => Ok(Self::Browser),
            other => Err(InvalidLevel(other)),
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Static => 0,
            Tier::Browser => 1,
        }
    }
}

/// Tier 1 only when the level allows it and the document needs it.
pub fn decide_tier(level: OptimizationLevel, has_exception_tags: bool) -> Tier {
    if level > OptimizationLevel::Static && has_exception_tags {
        Tier::Browser
    } else {
        Tier::Static
    }
}

/// Tier-0 optimization of `sheet`.
///
/// Selector-level checks are skipped for documents with exception tags, since
/// the static DOM cannot show what those components render.
pub async fn optimize_static<S: PresenceOracle>(
    sheet: &mut Stylesheet,
    classified: &ClassifiedSelectors,
    whitelist: &Whitelist,
    has_exception_tags: bool,
    static_oracle: &S,
) -> RemovalStats {
    let mut optimizer = Optimizer::new(sheet, whitelist);
    optimizer.remove_empty_rules();
    optimizer.remove_unused_amp_elements(classified, static_oracle).await;
    if !has_exception_tags {
        optimizer.remove_unused_selectors(classified, static_oracle).await;
    }
    optimizer.prune_empty_groups();
    optimizer.finish()
}

/// Tier-1 optimization: static passes first, the rest against `browser`.
pub async fn optimize_with_browser<S: PresenceOracle, B: PresenceOracle>(
    sheet: &mut Stylesheet,
    classified: &ClassifiedSelectors,
    whitelist: &Whitelist,
    static_oracle: &S,
    browser: &B,
) -> RemovalStats {
    let mut optimizer = Optimizer::new(sheet, whitelist);
    optimizer.remove_empty_rules();
    optimizer.remove_unused_amp_elements(classified, static_oracle).await;
    optimizer.remove_unused_selectors(classified, browser).await;
    optimizer.prune_empty_groups();
    optimizer.finish()
}
