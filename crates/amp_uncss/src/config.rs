//! Run configuration.
//!
//! Built programmatically, from `AMP_UNCSS_*` environment variables, or from a
//! JSON file using the camelCase option names (`optimizationLevel`,
//! `batchSize`, `selectorWhitelist`, ...). Missing keys take their defaults.

use crate::error::ConfigError;
use core::str::FromStr;
use core::time::Duration;
use optimizer::{OptimizationLevel, Whitelist};
use oracle::BrowserOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for one run of the remover.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AmpUncssConfig {
    /// 0 static only, 1 browser when needed, 2 behaves as 1.
    pub optimization_level: OptimizationLevel,
    /// Documents processed concurrently.
    pub batch_size: usize,
    /// Exact selectors or `/regex/` patterns that are never removed.
    pub selector_whitelist: Vec<String>,
    /// Return the first document's result instead of writing files.
    pub streamable: bool,
    /// Output directory in file-list mode.
    pub target_directory: PathBuf,
    /// Suffix appended to output file stems.
    pub filename_decorator: String,
    /// Pause after expanding collapsed content in the browser.
    pub settle_ms: u64,
    /// Bound for each navigation step.
    pub navigation_timeout_secs: u64,
    /// Chrome binary; auto-detected when unset.
    pub chrome_executable: Option<PathBuf>,
    /// Where in-memory documents are written for the browser; the system temp dir when unset.
    pub temp_directory: Option<PathBuf>,
}

impl Default for AmpUncssConfig {
    fn default() -> Self {
        Self {
            optimization_level: OptimizationLevel::Static,
            batch_size: 4,
            selector_whitelist: Vec::new(),
            streamable: false,
            target_directory: PathBuf::from("dist"),
            filename_decorator: String::new(),
            settle_ms: 200,
            navigation_timeout_secs: 60,
            chrome_executable: None,
            temp_directory: None,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|val| matches!(val.trim(), "1" | "true" | "yes"))
}

fn env_parsed<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    let parsed = raw.trim().parse::<T>().ok();
    if parsed.is_none() {
        log::warn!("ignoring unparsable {name}={raw}");
    }
    parsed
}

impl AmpUncssConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `AMP_UNCSS_OPTIMIZATION_LEVEL`, `AMP_UNCSS_BATCH_SIZE`,
    /// `AMP_UNCSS_WHITELIST` (comma separated), `AMP_UNCSS_STREAMABLE`,
    /// `AMP_UNCSS_TARGET_DIR`, `AMP_UNCSS_FILENAME_DECORATOR`,
    /// `AMP_UNCSS_SETTLE_MS`, `AMP_UNCSS_NAVIGATION_TIMEOUT_SECS`,
    /// `AMP_UNCSS_TEMP_DIR` and `CHROME_BIN`. Unset or unparsable variables
    /// keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(level) = env_parsed::<u8>("AMP_UNCSS_OPTIMIZATION_LEVEL").and_then(|raw_level| {
            OptimizationLevel::try_from(raw_level)
                .inspect_err(|err| log::warn!("ignoring AMP_UNCSS_OPTIMIZATION_LEVEL: {err}"))
                .ok()
        }) {
            config.optimization_level = level;
        }
        if let Some(batch_size) = env_parsed::<usize>("AMP_UNCSS_BATCH_SIZE") {
            config.batch_size = batch_size.max(1);
        }
        if let Ok(whitelist) = env::var("AMP_UNCSS_WHITELIST") {
            config.selector_whitelist = whitelist
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_owned)
                .collect();
        }
        if let Some(streamable) = env_flag("AMP_UNCSS_STREAMABLE") {
            config.streamable = streamable;
        }
        if let Ok(dir) = env::var("AMP_UNCSS_TARGET_DIR") {
            config.target_directory = PathBuf::from(dir);
        }
        if let Ok(decorator) = env::var("AMP_UNCSS_FILENAME_DECORATOR") {
            config.filename_decorator = decorator;
        }
        if let Some(settle_ms) = env_parsed("AMP_UNCSS_SETTLE_MS") {
            config.settle_ms = settle_ms;
        }
        if let Some(timeout) = env_parsed("AMP_UNCSS_NAVIGATION_TIMEOUT_SECS") {
            config.navigation_timeout_secs = timeout;
        }
        if let Ok(dir) = env::var("AMP_UNCSS_TEMP_DIR") {
            config.temp_directory = Some(PathBuf::from(dir));
        }
        if let Ok(chrome) = env::var("CHROME_BIN") {
            config.chrome_executable = Some(PathBuf::from(chrome));
        }
        config
    }

    /// Parse a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON or out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Json)
    }

    /// Read and parse a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as [`Self::from_json_str`].
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check the values a run depends on.
    ///
    /// # Errors
    ///
    /// Rejects a zero batch size and whitelist patterns that are not valid regular expressions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        self.whitelist()?;
        Ok(())
    }

    /// Compiled selector whitelist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Whitelist`] for an invalid `/regex/` entry.
    pub fn whitelist(&self) -> Result<Whitelist, ConfigError> {
        Ok(Whitelist::new(self.selector_whitelist.as_slice())?)
    }

    /// Launch and page preparation settings for the shared browser.
    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            chrome_executable: self.chrome_executable.clone(),
            navigation_timeout: Duration::from_secs(self.navigation_timeout_secs),
            settle: Duration::from_millis(self.settle_ms),
        }
    }

    /// Output path for an input named `name`: `<target>/<stem><decorator>.<ext>`.
    pub fn output_path(&self, name: &str) -> PathBuf {
        let file = Path::new(name);
        let stem = file
            .file_stem()
            .map_or_else(|| name.to_owned(), |stem| stem.to_string_lossy().into_owned());
        let mut output = format!("{stem}{}", self.filename_decorator);
        if let Some(ext) = file.extension() {
            output.push('.');
            output.push_str(&ext.to_string_lossy());
        }
        self.target_directory.join(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AmpUncssConfig::default();
        assert_eq!(config.optimization_level, OptimizationLevel::Static);
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.target_directory, PathBuf::from("dist"));
        assert_eq!(config.browser_options().settle, Duration::from_millis(200));
        assert_eq!(config.browser_options().navigation_timeout, Duration::from_secs(60));
    }

    #[test]
    fn json_uses_camel_case_and_defaults() -> Result<(), ConfigError> {
        let config = AmpUncssConfig::from_json_str(
            r#"{"optimizationLevel": 1, "selectorWhitelist": [".keep"], "filenameDecorator": "-min"}"#,
        )?;
        assert_eq!(config.optimization_level, OptimizationLevel::Browser);
        assert_eq!(config.selector_whitelist, vec![".keep".to_owned()]);
        assert_eq!(config.batch_size, 4);
        config.validate()
    }

    #[test]
    fn json_rejects_unknown_levels() {
        assert!(matches!(
            AmpUncssConfig::from_json_str(r#"{"optimizationLevel": 7}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn validation_catches_bad_values() {
        let zero = AmpUncssConfig {
            batch_size: 0,
            ..AmpUncssConfig::default()
        };
        assert!(matches!(zero.validate(), Err(ConfigError::ZeroBatchSize)));
        let bad_pattern = AmpUncssConfig {
            selector_whitelist: vec!["/(/".to_owned()],
            ..AmpUncssConfig::default()
        };
        assert!(matches!(bad_pattern.validate(), Err(ConfigError::Whitelist(_))));
    }

    #[test]
    fn output_paths_carry_the_decorator() {
        let config = AmpUncssConfig {
            target_directory: PathBuf::from("out"),
            filename_decorator: "-min".to_owned(),
            ..AmpUncssConfig::default()
        };
        assert_eq!(config.output_path("page.html"), PathBuf::from("out/page-min.html"));
        assert_eq!(config.output_path("README"), PathBuf::from("out/README-min"));
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        assert!(matches!(
            AmpUncssConfig::from_json_file(Path::new("/nonexistent/amp-uncss.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}
