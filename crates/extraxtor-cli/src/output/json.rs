//! JSON output formatter for machine-readable results.

use super::formatter::ExtractionSummary;
use super::formatter::JsonOutput;
use super::formatter::ListingStyle;
use super::formatter::OutputFormatter;
use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
use extraxtor_core::ArchiveManifest;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use std::time::SystemTime;

pub struct JsonFormatter {
    operation: &'static str,
}

impl JsonFormatter {
    pub fn new(operation: &'static str) -> Self {
        Self { operation }
    }

    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ExtractionOutput {
    archive: String,
    output_dir: String,
    files_extracted: usize,
    dirs_created: usize,
    bytes_extracted: u64,
    dirs_flattened: usize,
    files_skipped: usize,
    errors_encountered: usize,
    peak_copies: usize,
    duration_ms: u128,
    errors: Vec<String>,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tree: Option<Vec<TreeItem>>,
}

#[derive(Serialize)]
struct TreeItem {
    path: String,
    is_dir: bool,
}

#[derive(Serialize)]
struct ManifestOutput {
    archive: String,
    format: String,
    entries: Vec<ManifestItem>,
    file_count: usize,
    dir_count: usize,
    total_size: u64,
    total_items: usize,
}

#[derive(Serialize)]
struct ManifestItem {
    name: String,
    size: u64,
    mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
    kind: String,
    is_dir: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_name: Option<&'static str>,
}

fn rfc3339(time: Option<SystemTime>) -> Option<String> {
    time.map(|t| DateTime::<Utc>::from(t).to_rfc3339())
}

impl OutputFormatter for JsonFormatter {
    fn format_extraction_result(&self, summary: &ExtractionSummary<'_>) -> Result<()> {
        let report = summary.report;
        let data = ExtractionOutput {
            archive: summary.archive.display().to_string(),
            output_dir: summary.output_dir.display().to_string(),
            files_extracted: report.files_extracted,
            dirs_created: report.dirs_created,
            bytes_extracted: report.bytes_extracted,
            dirs_flattened: report.dirs_flattened,
            files_skipped: report.files_skipped,
            errors_encountered: report.errors_encountered,
            peak_copies: report.peak_copies,
            duration_ms: report.duration.as_millis(),
            errors: report.errors.clone(),
            warnings: report.warnings.clone(),
            tree: summary.tree.as_ref().map(|tree| {
                tree.entries
                    .iter()
                    .map(|entry| TreeItem {
                        path: entry.path.to_string_lossy().replace('\\', "/"),
                        is_dir: entry.is_dir,
                    })
                    .collect()
            }),
        };

        Self::output(&JsonOutput::success("extract", data))
    }

    fn format_manifest(
        &self,
        archive: &Path,
        manifest: &ArchiveManifest,
        _style: ListingStyle,
    ) -> Result<()> {
        let data = ManifestOutput {
            archive: archive.display().to_string(),
            format: manifest.format.to_string(),
            entries: manifest
                .entries
                .iter()
                .map(|entry| ManifestItem {
                    name: entry.name.clone(),
                    size: entry.size,
                    mode: format!("{:04o}", entry.mode & 0o7777),
                    modified: rfc3339(entry.modified),
                    kind: entry.kind.to_string(),
                    is_dir: entry.is_dir(),
                    link_name: entry.link_name,
                })
                .collect(),
            file_count: manifest.file_count,
            dir_count: manifest.dir_count,
            total_size: manifest.total_size,
            total_items: manifest.total_entries,
        };

        Self::output(&JsonOutput::success("inspect", data))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error(self.operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_envelope_omits_data() {
        let output = JsonOutput::<()>::error("extract", "boom");
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["operation"], "extract");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "boom");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_rfc3339_times() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        assert_eq!(
            rfc3339(Some(time)).unwrap(),
            "2020-09-13T12:26:40+00:00"
        );
        assert!(rfc3339(None).is_none());
    }
}
