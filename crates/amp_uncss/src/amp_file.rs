//! Per-document pipeline: prep, optimize, teardown.
//!
//! A document moves `instantiated → started → optimized → complete` or drops to
//! `failed` from any of them. Failures stay local to the document, whose
//! original bytes are then passed through unchanged.

use crate::error::DocumentError;
use crate::report::{DocumentReport, DocumentStatus, StreamResult, TimelineEntry};
use crate::source::SourceDocument;
use core::str::from_utf8;
use css::{ClassifiedSelectors, Stylesheet, classify, parse_stylesheet_with_diagnostics};
use html::StaticDom;
use html::stubs::{exception_tags, stub_page};
use optimizer::{OptimizationLevel, RemovalStats, Tier, Whitelist, decide_tier, optimize_static, optimize_with_browser};
use oracle::{BrowserHandle, ChromeOracle, PresenceOracle as _, StaticOracle};
use std::io::Write as _;
use std::path::Path;
use tempfile::Builder;
use tokio::time::Instant;

/// Settings shared by every document of a run.
#[derive(Clone, Copy)]
pub struct PipelineContext<'run> {
    pub level: OptimizationLevel,
    pub whitelist: &'run Whitelist,
    /// Directory for temporary copies of in-memory documents.
    pub temp_directory: Option<&'run Path>,
    pub browser: &'run BrowserHandle,
}

/// Result of the prep stage.
struct Prepared {
    sheet: Stylesheet,
    classified: ClassifiedSelectors,
    static_oracle: StaticOracle,
    has_exception_tags: bool,
    tier: Tier,
}

/// One document and everything the pipeline learned about it.
pub struct AmpFile {
    source: SourceDocument,
    status: DocumentStatus,
    created: Instant,
    timeline: Vec<TimelineEntry>,
    warnings: Vec<String>,
    tier: Option<Tier>,
    has_exception_tags: bool,
    stats: RemovalStats,
    output: Option<String>,
    failure: Option<DocumentError>,
}

impl AmpFile {
    pub fn new(source: SourceDocument) -> Self {
        let mut file = Self {
            source,
            status: DocumentStatus::Instantiated,
            created: Instant::now(),
            timeline: Vec::new(),
            warnings: Vec::new(),
            tier: None,
            has_exception_tags: false,
            stats: RemovalStats::default(),
            output: None,
            failure: None,
        };
        file.record(DocumentStatus::Instantiated);
        file
    }

    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub const fn status(&self) -> DocumentStatus {
        self.status
    }

    pub const fn failure(&self) -> Option<&DocumentError> {
        self.failure.as_ref()
    }

    /// Optimized HTML for complete documents, the original bytes otherwise.
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_ref().map_or(self.source.contents.as_slice(), |html| html.as_bytes())
    }

    fn record(&mut self, status: DocumentStatus) {
        let elapsed_ms = u64::try_from(self.created.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.timeline.push(TimelineEntry { status, elapsed_ms });
    }

    fn transition(&mut self, status: DocumentStatus) {
        if self.status.is_final() {
            return;
        }
        log::info!("{}: {} -> {status}", self.source.name, self.status);
        self.status = status;
        self.record(status);
    }

    /// Mark the document failed; its original content becomes the output.
    pub fn fail(&mut self, err: DocumentError) {
        if self.status == DocumentStatus::Failed {
            return;
        }
        log::error!("{}: {err}", self.source.name);
        self.status = DocumentStatus::Failed;
        self.record(DocumentStatus::Failed);
        self.output = None;
        self.failure = Some(err);
    }

    fn warn(&mut self, warning: String) {
        log::warn!("{}: {warning}", self.source.name);
        self.warnings.push(warning);
    }

    /// Run every stage. Does nothing for documents that already finished.
    pub async fn process(&mut self, ctx: PipelineContext<'_>) {
        if self.status.is_final() {
            return;
        }
        if let Err(err) = self.run_stages(ctx).await {
            self.fail(err);
        }
    }

    async fn run_stages(&mut self, ctx: PipelineContext<'_>) -> Result<(), DocumentError> {
        let raw = self.validated_contents()?;
        self.transition(DocumentStatus::Started);
        let prepared = self.prep(&raw, ctx.level)?;

        let mut page = match prepared.tier {
            Tier::Browser => Some(self.acquire_page(&raw, ctx).await?),
            Tier::Static => None,
        };
        let Prepared {
            mut sheet,
            classified,
            static_oracle,
            has_exception_tags,
            ..
        } = prepared;
        self.stats = match &page {
            Some(browser) => {
                optimize_with_browser(&mut sheet, &classified, ctx.whitelist, &static_oracle, browser).await
            }
            None => {
                optimize_static(&mut sheet, &classified, ctx.whitelist, has_exception_tags, &static_oracle).await
            }
        };
        self.transition(DocumentStatus::Optimized);

        let output = teardown(&raw, &sheet);
        if let Some(browser) = page.as_mut() {
            browser.shutdown().await;
        }
        self.output = Some(output?);
        self.transition(DocumentStatus::Complete);
        Ok(())
    }

    /// Empty, whitespace-only and non-UTF-8 inputs are rejected before any parsing.
    fn validated_contents(&self) -> Result<String, DocumentError> {
        let text = from_utf8(&self.source.contents)
            .map_err(|err| DocumentError::Parse(format!("input is not valid UTF-8: {err}")))?;
        if text.trim().is_empty() {
            return Err(DocumentError::Parse("input is empty".to_owned()));
        }
        Ok(text.to_owned())
    }

    fn prep(&mut self, raw: &str, level: OptimizationLevel) -> Result<Prepared, DocumentError> {
        let mut dom = StaticDom::parse(raw).map_err(|err| DocumentError::Parse(format!("{err:#}")))?;
        stub_page(&mut dom);
        let tags = exception_tags(&dom);
        let has_exception_tags = !tags.is_empty();
        if has_exception_tags {
            log::debug!("{}: runtime-dependent components {tags:?}", self.source.name);
        }

        let parsed = parse_stylesheet_with_diagnostics(&dom.custom_style_text());
        for dropped in parsed.dropped {
            self.warn(format!("amp-custom CSS: {dropped}"));
        }
        let classified = classify(&parsed.sheet);
        let tier = decide_tier(level, has_exception_tags);
        self.tier = Some(tier);
        self.has_exception_tags = has_exception_tags;
        Ok(Prepared {
            sheet: parsed.sheet,
            classified,
            static_oracle: StaticOracle::new(&dom),
            has_exception_tags,
            tier,
        })
    }

    /// Open the document in a browser tab.
    ///
    /// Documents without a path are written to a temporary `.html` file that
    /// is removed again once the page has loaded.
    async fn acquire_page(&mut self, raw: &str, ctx: PipelineContext<'_>) -> Result<ChromeOracle, DocumentError> {
        if let Some(path) = &self.source.path {
            return ctx
                .browser
                .open_page(path)
                .await
                .map_err(|err| DocumentError::Browser(format!("{err:#}")));
        }

        let mut builder = Builder::new();
        builder.prefix("amp-uncss-").suffix(".html");
        let created = ctx
            .temp_directory
            .map_or_else(|| builder.tempfile(), |dir| builder.tempfile_in(dir));
        let mut temp = created
            .map_err(|err| DocumentError::Resource(format!("cannot create temporary file: {err}")))?;
        let temp_path = temp.path().to_path_buf();
        if let Err(err) = temp.write_all(raw.as_bytes()).and_then(|()| temp.flush()) {
            return Err(DocumentError::Resource(format!("cannot write {}: {err}", temp_path.display())));
        }

        let opened = ctx.browser.open_page(&temp_path).await;
        if let Err(err) = temp.close() {
            self.warn(format!("cannot delete {}: {err}", temp_path.display()));
        }
        opened.map_err(|err| DocumentError::Browser(format!("{err:#}")))
    }

    pub fn report(&self) -> DocumentReport {
        DocumentReport {
            file_name: self.source.name.clone(),
            status: self.status,
            failure: self.failure.as_ref().map(ToString::to_string),
            tier: self.tier,
            has_exception_tags: self.has_exception_tags,
            input_size: self.source.contents.len(),
            output_size: self.output_bytes().len(),
            selectors_removed: self.stats.clone(),
            warnings: self.warnings.clone(),
            timeline: self.timeline.clone(),
        }
    }

    pub fn into_stream_result(self) -> StreamResult {
        let report = self.report();
        let optimized_html = self
            .output
            .unwrap_or_else(|| String::from_utf8_lossy(&self.source.contents).into_owned());
        StreamResult { optimized_html, report }
    }
}

/// Reparse the untouched input and swap in the pruned stylesheet.
///
/// Stubbed markup never reaches the output.
fn teardown(raw: &str, sheet: &Stylesheet) -> Result<String, DocumentError> {
    let mut pristine = StaticDom::parse(raw).map_err(|err| DocumentError::Parse(format!("{err:#}")))?;
    pristine.replace_custom_styles(&sheet.to_css());
    Ok(pristine.to_html())
}
