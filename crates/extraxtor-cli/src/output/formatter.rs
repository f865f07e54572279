//! Output formatter trait for CLI results.

use anyhow::Result;
use extraxtor_core::ArchiveManifest;
use extraxtor_core::ExtractionReport;
use extraxtor_core::inspection::DirListingEntry;
use extraxtor_core::inspection::TreeListing;
use serde::Serialize;
use std::path::Path;

/// Everything shown after an extraction finishes.
pub struct ExtractionSummary<'a> {
    pub archive: &'a Path,
    pub output_dir: &'a Path,
    pub report: &'a ExtractionReport,
    /// Directory tree of the output, requested with `--tree`.
    pub tree: Option<TreeListing>,
    /// Top-level listing of the output, shown in verbose mode.
    pub contents: Option<Vec<DirListingEntry>>,
}

/// How `inspect` renders a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStyle {
    Plain,
    Tree,
    Long,
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format extraction result
    fn format_extraction_result(&self, summary: &ExtractionSummary<'_>) -> Result<()>;

    /// Format an archive manifest
    fn format_manifest(
        &self,
        archive: &Path,
        manifest: &ArchiveManifest,
        style: ListingStyle,
    ) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> JsonOutput<()> {
        JsonOutput {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
