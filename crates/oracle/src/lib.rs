//! Element-presence queries over a rendered document.
//!
//! [`StaticOracle`] answers from the stubbed static DOM, [`ChromeOracle`] from a
//! live headless Chrome page. Both sit behind [`PresenceOracle`]; callers usually
//! go through [`count_or_used`] and [`query_all_or_none`], which never fail.

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

mod browser;
mod chrome;
mod static_dom;

pub use browser::{BrowserHandle, BrowserOptions, ChromeBrowser};
pub use chrome::ChromeOracle;
pub use static_dom::StaticOracle;

use core::error::Error;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Count reported when a query fails, so the selector is kept.
pub const FALLBACK_COUNT: usize = 1;

/// Identity of one matched element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    pub id: String,
    pub class_name: String,
}

impl ElementInfo {
    /// Whether the element's class attribute contains `class` as a token.
    pub fn has_class(&self, class: &str) -> bool {
        self.class_name.split_ascii_whitespace().any(|token| token == class)
    }
}

/// A query the backend could not answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The selector is not understood by the backend.
    InvalidSelector { selector: String, reason: String },
    /// The browser page failed or went away.
    Browser(String),
}

impl fmt::Display for OracleError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSelector { selector, reason } => {
                write!(fmt, "invalid selector `{selector}`: {reason}")
            }
            Self::Browser(message) => write!(fmt, "browser query failed: {message}"),
        }
    }
}

impl Error for OracleError {}

/// Answers "does anything match this selector" for one document.
#[allow(
    async_fn_in_trait,
    reason = "Oracles are awaited on the task that owns them and need not be Send"
)]
pub trait PresenceOracle {
    /// Number of elements matching `selector`.
    async fn count(&self, selector: &str) -> Result<usize, OracleError>;

    /// `id` and `class` of every element matching `selector`.
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementInfo>, OracleError>;

    /// Release backend resources. Queries after shutdown fail.
    async fn shutdown(&mut self) {}
}

/// [`PresenceOracle::count`], with failures treated as a match.
pub async fn count_or_used<O: PresenceOracle>(oracle: &O, selector: &str) -> usize {
    match oracle.count(selector).await {
        Ok(count) => count,
        Err(err) => {
            log::warn!("{err}; keeping `{selector}`");
            FALLBACK_COUNT
        }
    }
}

/// [`PresenceOracle::query_all`]; `None` means the answer is unknown and the caller keeps the rule.
pub async fn query_all_or_none<O: PresenceOracle>(oracle: &O, selector: &str) -> Option<Vec<ElementInfo>> {
    match oracle.query_all(selector).await {
        Ok(elements) => Some(elements),
        Err(err) => {
            log::warn!("{err}; treating `{selector}` as used");
            None
        }
    }
}
