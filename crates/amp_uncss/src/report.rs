//! Serializable results of a run.

use crate::config::AmpUncssConfig;
use core::fmt;
use optimizer::{RemovalStats, Tier};
use serde::{Deserialize, Serialize};

/// Where a document is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Instantiated,
    Started,
    Optimized,
    Complete,
    Failed,
}

impl DocumentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instantiated => "instantiated",
            Self::Started => "started",
            Self::Optimized => "optimized",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    /// `complete` and `failed` accept no further transitions.
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

/// One status transition, timed from the moment the document was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub status: DocumentStatus,
    pub elapsed_ms: u64,
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReport {
    pub file_name: String,
    pub status: DocumentStatus,
    /// `"<kind> error: <message>"` for failed documents.
    pub failure: Option<String>,
    /// Unset when the document failed before a tier was chosen.
    pub tier: Option<Tier>,
    pub has_exception_tags: bool,
    pub input_size: usize,
    pub output_size: usize,
    pub selectors_removed: RemovalStats,
    pub warnings: Vec<String>,
    pub timeline: Vec<TimelineEntry>,
}

impl DocumentReport {
    pub const fn is_complete(&self) -> bool {
        matches!(self.status, DocumentStatus::Complete)
    }
}

/// Options and per-document reports of a whole run, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub options: AmpUncssConfig,
    pub files: Vec<DocumentReport>,
    pub optimized: usize,
    pub failed: usize,
    pub selectors_removed: usize,
    pub bytes_saved: usize,
}

impl RunReport {
    /// Aggregate `files`. Failed documents count towards `failed` only.
    pub fn new(options: AmpUncssConfig, files: Vec<DocumentReport>) -> Self {
        let completed = files.iter().filter(|file| file.is_complete());
        let (optimized, selectors_removed, bytes_saved) =
            completed.fold((0, 0, 0), |(count, removed, saved), file| {
                (
                    count + 1,
                    removed + file.selectors_removed.total(),
                    saved + file.input_size.saturating_sub(file.output_size),
                )
            });
        let failed = files.len() - optimized;
        Self {
            options,
            files,
            optimized,
            failed,
            selectors_removed,
            bytes_saved,
        }
    }

    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Streamable-mode result for a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamResult {
    pub optimized_html: String,
    pub report: DocumentReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use css::SelectorCategory;
    use serde_json::json;

    fn report(file_name: &str, status: DocumentStatus, input_size: usize, output_size: usize) -> DocumentReport {
        let mut selectors_removed = RemovalStats::default();
        if status == DocumentStatus::Complete {
            selectors_removed.record(SelectorCategory::General, ".unused");
        }
        DocumentReport {
            file_name: file_name.to_owned(),
            status,
            failure: None,
            tier: Some(Tier::Static),
            has_exception_tags: false,
            input_size,
            output_size,
            selectors_removed,
            warnings: Vec::new(),
            timeline: vec![TimelineEntry {
                status,
                elapsed_ms: 3,
            }],
        }
    }

    #[test]
    fn run_totals_skip_failed_documents() {
        let run = RunReport::new(
            AmpUncssConfig::default(),
            vec![
                report("a.html", DocumentStatus::Complete, 100, 60),
                report("b.html", DocumentStatus::Failed, 50, 50),
                report("c.html", DocumentStatus::Complete, 10, 10),
            ],
        );
        assert_eq!(run.optimized, 2);
        assert_eq!(run.failed, 1);
        assert_eq!(run.selectors_removed, 2);
        assert_eq!(run.bytes_saved, 40);
        assert!(run.has_failures());
    }

    #[test]
    fn document_reports_serialize_in_camel_case() -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(report("a.html", DocumentStatus::Complete, 9, 4))?;
        assert_eq!(value["fileName"], json!("a.html"));
        assert_eq!(value["status"], json!("complete"));
        assert_eq!(value["tier"], json!(0));
        assert_eq!(value["hasExceptionTags"], json!(false));
        assert_eq!(value["selectorsRemoved"]["general"]["count"], json!(1));
        assert_eq!(value["timeline"][0], json!({"status": "complete", "elapsedMs": 3}));
        Ok(())
    }
}
