//! `amp-uncss <file.html>...`: optimize the named documents into the target directory.

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]

use amp_uncss::{AmpUncssConfig, Orchestrator, RunOutput, SourceDocument};
use anyhow::{Context as _, Result, bail};
use std::env;
use std::io::{self, Read as _, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;

/// `AMP_UNCSS_CONFIG` names a JSON file; otherwise the environment is used.
fn load_config() -> Result<AmpUncssConfig> {
    let Some(path) = env::var_os("AMP_UNCSS_CONFIG").map(PathBuf::from) else {
        return Ok(AmpUncssConfig::from_env());
    };
    AmpUncssConfig::from_json_file(&path).with_context(|| format!("failed to load config from {}", path.display()))
}

/// Documents named on the command line. Streamable runs without arguments read stdin.
fn collect_documents(config: &AmpUncssConfig) -> Result<(Vec<SourceDocument>, usize)> {
    let paths: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        if !config.streamable {
            bail!("usage: amp-uncss <file.html>...");
        }
        let mut contents = Vec::new();
        io::stdin().read_to_end(&mut contents).context("failed to read stdin")?;
        return Ok((vec![SourceDocument::from_memory("stdin.html", contents)], 0));
    }

    let mut documents = Vec::with_capacity(paths.len());
    let mut unreadable = 0;
    for path in &paths {
        match SourceDocument::from_path(path) {
            Ok(document) => documents.push(document),
            Err(err) => {
                log::error!("{err}");
                unreadable += 1;
            }
        }
    }
    Ok((documents, unreadable))
}

fn log_summary(output: &RunOutput) {
    for file in &output.report.files {
        if let Some(failure) = &file.failure {
            log::error!("{}: {failure}", file.file_name);
            continue;
        }
        log::info!(
            "{}: {} -> {} bytes, {} selectors removed",
            file.file_name,
            file.input_size,
            file.output_size,
            file.selectors_removed.total()
        );
    }
    log::info!(
        "{} optimized, {} failed, {} bytes saved",
        output.report.optimized,
        output.report.failed,
        output.report.bytes_saved
    );
}

/// Whether every document completed.
fn run() -> Result<bool> {
    let config = load_config()?;
    let (documents, unreadable) = collect_documents(&config)?;
    let orchestrator = Orchestrator::from_config(config)?;

    let runtime = Runtime::new()?;
    let output = runtime.block_on(async move {
        let output = orchestrator.run(documents).await;
        orchestrator.shutdown().await;
        output
    });
    log_summary(&output);

    if let Some(stream) = &output.stream {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(stream.optimized_html.as_bytes())
            .and_then(|()| stdout.flush())
            .context("failed to write stdout")?;
    }
    Ok(unreadable == 0 && !output.report.has_failures())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
