//! Error types surfaced by the pipeline.

use core::error::Error;
use core::fmt;
use optimizer::{InvalidLevel, WhitelistError};
use std::io;
use std::path::PathBuf;

/// Why a single document could not be optimized.
///
/// Document errors never abort a run; the document is reported as failed and
/// its original content passes through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The input is empty, not UTF-8, or could not be parsed.
    Parse(String),
    /// Launching the browser, opening a tab or navigating failed.
    Browser(String),
    /// A file the pipeline needs could not be read or written.
    Resource(String),
}

impl DocumentError {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::Browser(_) => "browser",
            Self::Resource(_) => "resource",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Parse(message) | Self::Browser(message) | Self::Resource(message) => message,
        }
    }
}

impl fmt::Display for DocumentError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{} error: {}", self.kind(), self.message())
    }
}

impl Error for DocumentError {}

/// Invalid or unreadable configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Json(serde_json::Error),
    Level(InvalidLevel),
    ZeroBatchSize,
    Whitelist(WhitelistError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(fmt, "cannot read config {}: {source}", path.display()),
            Self::Json(err) => write!(fmt, "malformed config: {err}"),
            Self::Level(err) => write!(fmt, "{err}"),
            Self::ZeroBatchSize => fmt.write_str("batch size must be at least 1"),
            Self::Whitelist(err) => write!(fmt, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Level(err) => Some(err),
            Self::Whitelist(err) => Some(err),
            Self::ZeroBatchSize => None,
        }
    }
}

impl From<WhitelistError> for ConfigError {
    fn from(err: WhitelistError) -> Self {
        Self::Whitelist(err)
    }
}

impl From<InvalidLevel> for ConfigError {
    fn from(err: InvalidLevel) -> Self {
        Self::Level(err)
    }
}
