//! Removes unused CSS from AMP pages.
//!
//! Each document's static DOM is expanded with approximations of the markup AMP
//! components render at runtime, then every rule of the `amp-custom` stylesheet
//! is checked against it. Pages whose components depend on runtime data can be
//! checked in headless Chrome instead. See [`Orchestrator`] for running a batch.

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod amp_file;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod source;

pub use amp_file::{AmpFile, PipelineContext};
pub use config::AmpUncssConfig;
pub use error::{ConfigError, DocumentError};
pub use optimizer::{OptimizationLevel, Tier};
pub use orchestrator::{Orchestrator, RunOutput};
pub use report::{DocumentReport, DocumentStatus, RunReport, StreamResult, TimelineEntry};
pub use source::SourceDocument;
