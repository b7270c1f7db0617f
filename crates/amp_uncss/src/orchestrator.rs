//! Batch scheduling over the per-document pipeline.

use crate::amp_file::{AmpFile, PipelineContext};
use crate::config::AmpUncssConfig;
use crate::error::{ConfigError, DocumentError};
use crate::report::{RunReport, StreamResult};
use crate::source::SourceDocument;
use futures::future::join_all;
use optimizer::Whitelist;
use oracle::BrowserHandle;
use std::fs;

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub report: RunReport,
    /// First document's result in streamable mode.
    pub stream: Option<StreamResult>,
}

/// Runs documents through the pipeline `batch_size` at a time, sharing one browser.
pub struct Orchestrator {
    config: AmpUncssConfig,
    whitelist: Whitelist,
    browser: BrowserHandle,
}

impl Orchestrator {
    /// # Errors
    ///
    /// Returns the first problem [`AmpUncssConfig::validate`] finds.
    pub fn new(config: AmpUncssConfig, browser: BrowserHandle) -> Result<Self, ConfigError> {
        config.validate()?;
        let whitelist = config.whitelist()?;
        Ok(Self {
            config,
            whitelist,
            browser,
        })
    }

    /// Orchestrator configured from `config`, with a browser built from its options.
    ///
    /// # Errors
    ///
    /// As [`Self::new`].
    pub fn from_config(config: AmpUncssConfig) -> Result<Self, ConfigError> {
        let browser = BrowserHandle::new(config.browser_options());
        Self::new(config, browser)
    }

    pub const fn config(&self) -> &AmpUncssConfig {
        &self.config
    }

    pub const fn browser(&self) -> &BrowserHandle {
        &self.browser
    }

    /// Process `documents` and deliver the results.
    ///
    /// Batches run one after another; the documents of a batch run concurrently
    /// on the calling task. In file-list mode every output, failed documents'
    /// original content included, is written below the target directory. In
    /// streamable mode only the first document is processed and returned.
    pub async fn run(&self, documents: Vec<SourceDocument>) -> RunOutput {
        let documents = if self.config.streamable && documents.len() > 1 {
            log::warn!("streamable mode handles one document, ignoring {} more", documents.len() - 1);
            documents.into_iter().take(1).collect()
        } else {
            documents
        };

        let mut files: Vec<AmpFile> = documents.into_iter().map(AmpFile::new).collect();
        let ctx = PipelineContext {
            level: self.config.optimization_level,
            whitelist: &self.whitelist,
            temp_directory: self.config.temp_directory.as_deref(),
            browser: &self.browser,
        };
        let batch_count = files.len().div_ceil(self.config.batch_size);
        for (index, batch) in files.chunks_mut(self.config.batch_size).enumerate() {
            log::info!("batch {}/{batch_count}: {} documents", index + 1, batch.len());
            join_all(batch.iter_mut().map(|file| file.process(ctx))).await;
        }

        if self.config.streamable {
            let report = RunReport::new(self.config.clone(), files.iter().map(AmpFile::report).collect());
            let stream = files.into_iter().next().map(AmpFile::into_stream_result);
            return RunOutput { report, stream };
        }

        for file in &mut files {
            if let Err(err) = self.write_output(file) {
                file.fail(err);
            }
        }
        let report = RunReport::new(self.config.clone(), files.iter().map(AmpFile::report).collect());
        log::info!(
            "{} optimized, {} failed, {} selectors removed",
            report.optimized,
            report.failed,
            report.selectors_removed
        );
        RunOutput { report, stream: None }
    }

    fn write_output(&self, file: &AmpFile) -> Result<(), DocumentError> {
        let target = self.config.output_path(file.name());
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| DocumentError::Resource(format!("cannot create {}: {err}", parent.display())))?;
        }
        fs::write(&target, file.output_bytes())
            .map_err(|err| DocumentError::Resource(format!("cannot write {}: {err}", target.display())))?;
        log::debug!("wrote {}", target.display());
        Ok(())
    }

    /// Close the shared browser if any document launched it.
    pub async fn shutdown(self) {
        self.browser.close().await;
    }
}
