//! User-protected selectors.

use core::error::Error;
use core::fmt;
use regex::Regex;
use std::collections::HashSet;

/// A whitelist entry that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistError {
    pub entry: String,
    pub reason: String,
}

impl fmt::Display for WhitelistError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "invalid whitelist pattern `{}`: {}", self.entry, self.reason)
    }
}

impl Error for WhitelistError {}

/// Selectors that are never removed by usage checks.
///
/// Entries written as `/pattern/` are regular expressions matched anywhere in
/// the selector text; everything else must equal the selector exactly.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    exact: HashSet<String>,
    patterns: Vec<Regex>,
}

impl Whitelist {
    /// Compile `entries`.
    ///
    /// # Errors
    ///
    /// Returns the first `/pattern/` entry that is not a valid regular expression.
    pub fn new<S: AsRef<str>>(entries: &[S]) -> Result<Self, WhitelistError> {
        let mut whitelist = Self::default();
        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            match entry
                .strip_prefix('/')
                .and_then(|rest| rest.strip_suffix('/'))
                .filter(|pattern| !pattern.is_empty())
            {
                Some(pattern) => {
                    let regex = Regex::new(pattern).map_err(|err| WhitelistError {
                        entry: entry.to_owned(),
                        reason: err.to_string(),
                    })?;
                    whitelist.patterns.push(regex);
                }
                None => {
                    whitelist.exact.insert(entry.to_owned());
                }
            }
        }
        Ok(whitelist)
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty()
    }

    /// Whether `selector` is protected.
    pub fn protects(&self, selector: &str) -> bool {
        let selector = selector.trim();
        self.exact.contains(selector) || self.patterns.iter().any(|regex| regex.is_match(selector))
    }

    /// A comma group is protected through its full text or any single branch.
    pub fn protects_group(&self, text: &str, branches: &[String]) -> bool {
        self.protects(text) || branches.iter().any(|branch| self.protects(branch))
    }

    /// A keyframes block is protected by its name or by `@keyframes name`.
    pub fn protects_keyframes(&self, name: &str) -> bool {
        self.protects(name) || self.protects(&format!("@keyframes {name}"))
    }
}
