#![allow(dead_code, reason = "Each test binary uses a different subset of helpers")]

use amp_uncss::{AmpUncssConfig, Orchestrator, RunOutput, SourceDocument};
use anyhow::Result;
use std::fs;
use std::path::PathBuf;

/// Directory holding the HTML fixtures.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub fn fixture(name: &str) -> Result<SourceDocument> {
    Ok(SourceDocument::from_path(&fixtures_dir().join(name))?)
}

pub fn fixture_text(name: &str) -> Result<String> {
    Ok(fs::read_to_string(fixtures_dir().join(name))?)
}

pub fn init_logging() {
    let _ignore = env_logger::builder().is_test(true).try_init();
}

/// Run `documents` through a fresh orchestrator and close its browser.
pub async fn run(config: AmpUncssConfig, documents: Vec<SourceDocument>) -> Result<RunOutput> {
    init_logging();
    let orchestrator = Orchestrator::from_config(config)?;
    let output = orchestrator.run(documents).await;
    orchestrator.shutdown().await;
    Ok(output)
}

/// Streamable config so tests can inspect the HTML without touching the disk.
pub fn streamable(config: AmpUncssConfig) -> AmpUncssConfig {
    AmpUncssConfig {
        streamable: true,
        ..config
    }
}

/// Contents of the single `amp-custom` block in `html`.
pub fn custom_css(html: &str) -> Option<&str> {
    let start = html.find("<style amp-custom>")? + "<style amp-custom>".len();
    let end = html[start..].find("</style>")? + start;
    Some(&html[start..end])
}
