//! Human-readable output formatter with colors and styling.

use super::formatter::ExtractionSummary;
use super::formatter::ListingStyle;
use super::formatter::OutputFormatter;
use anyhow::Result;
use chrono::DateTime;
use chrono::Local;
use console::Term;
use console::style;
use extraxtor_core::ArchiveManifest;
use extraxtor_core::EntryKind;
use extraxtor_core::inspection::DirListingEntry;
use extraxtor_core::inspection::TreeListing;
use std::path::Path;
use std::time::Duration;
use std::time::SystemTime;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    pub(crate) fn format_size(bytes: u64) -> String {
        const UNIT: u64 = 1024;
        if bytes < UNIT {
            return format!("{bytes} B");
        }

        let mut div = UNIT;
        let mut exp = 0;
        let mut n = bytes / UNIT;
        while n >= UNIT {
            div *= UNIT;
            exp += 1;
            n /= UNIT;
        }
        let prefix = ['K', 'M', 'G', 'T', 'P', 'E'][exp];
        format!("{:.1} {prefix}B", bytes as f64 / div as f64)
    }

    pub(crate) fn format_mode(mode: u32, kind: char) -> String {
        let mut out = String::with_capacity(10);
        out.push(kind);
        for shift in [6, 3, 0] {
            let bits = (mode >> shift) & 0o7;
            out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        out
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn format_time(time: Option<SystemTime>) -> String {
        time.map_or_else(
            || "-".repeat(16),
            |t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string(),
        )
    }

    fn format_duration(duration: Duration) -> String {
        if duration.as_secs() >= 1 {
            format!("{:.2}s", duration.as_secs_f64())
        } else {
            format!("{}ms", duration.as_millis())
        }
    }

    fn kind_char(kind: EntryKind) -> char {
        match kind {
            EntryKind::Directory => 'd',
            EntryKind::Symlink => 'l',
            EntryKind::File | EntryKind::Other => '-',
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.use_colors {
            style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn write_tree(&self, tree: &TreeListing) {
        self.line("");
        self.line(&self.heading("Directory tree:"));
        for entry in &tree.entries {
            let indent = "    ".repeat(entry.depth);
            let name = if entry.is_dir {
                let name = format!("{}/", entry.name());
                if self.use_colors {
                    style(name).blue().bold().to_string()
                } else {
                    name
                }
            } else {
                entry.name()
            };
            self.line(&format!("{indent}├── {name}"));
        }
        if tree.hidden > 0 {
            self.line(&format!(
                "... and {} more items",
                Self::format_number(tree.hidden)
            ));
        }
    }

    fn write_contents(&self, contents: &[DirListingEntry]) {
        self.line("");
        self.line(&self.heading("Contents:"));
        for entry in contents {
            let kind = if entry.is_dir { 'd' } else { '-' };
            let name = if entry.is_dir {
                format!("{}/", entry.name)
            } else {
                entry.name.clone()
            };
            self.line(&format!(
                "  {}  {:>8}  {}  {name}",
                Self::format_mode(entry.mode, kind),
                Self::format_size(entry.size),
                Self::format_time(entry.modified),
            ));
        }
    }

    fn totals(manifest: &ArchiveManifest) -> String {
        format!(
            "{} files, {} directories, {} total",
            Self::format_number(manifest.file_count),
            Self::format_number(manifest.dir_count),
            Self::format_size(manifest.total_size)
        )
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_extraction_result(&self, summary: &ExtractionSummary<'_>) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        let report = summary.report;

        let done = format!(
            "Extraction completed in {}",
            Self::format_duration(report.duration)
        );
        if self.use_colors {
            self.line(&format!("{} {done}", style("✓").green().bold()));
        } else {
            self.line(&done);
        }

        self.line(&format!(
            "  Files:        {}",
            Self::format_number(report.files_extracted)
        ));
        self.line(&format!(
            "  Directories:  {}",
            Self::format_number(report.dirs_created)
        ));
        self.line(&format!(
            "  Size:         {}",
            Self::format_size(report.bytes_extracted)
        ));
        if report.dirs_flattened > 0 {
            self.line(&format!("  Flattened:    {}", report.dirs_flattened));
        }
        if report.files_skipped > 0 {
            self.line(&format!("  Skipped:      {}", report.files_skipped));
        }
        if report.has_errors() {
            let errors = format!("  Errors:       {}", report.errors_encountered);
            if self.use_colors {
                self.line(&style(errors).yellow().to_string());
            } else {
                self.line(&errors);
            }
        }
        if report.has_warnings() {
            self.line(&format!("  Warnings:     {}", report.warnings.len()));
        }
        self.line(&format!("  Output:       {}", summary.output_dir.display()));

        if self.verbose {
            for error in &report.errors {
                self.format_warning(error);
            }
            for warning in &report.warnings {
                self.format_warning(warning);
            }
        }

        if let Some(tree) = &summary.tree {
            self.write_tree(tree);
        } else if let Some(contents) = &summary.contents {
            self.write_contents(contents);
        }

        Ok(())
    }

    fn format_manifest(
        &self,
        archive: &Path,
        manifest: &ArchiveManifest,
        style: ListingStyle,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        match style {
            ListingStyle::Plain => {
                for entry in &manifest.entries {
                    self.line(&entry.name);
                }
            }
            ListingStyle::Tree => {
                for entry in &manifest.entries {
                    let prefix = if entry.is_dir() { "📁" } else { "📄" };
                    self.line(&format!("{prefix} {}", entry.name));
                }
            }
            ListingStyle::Long => {
                let name = archive
                    .file_name()
                    .map_or_else(|| archive.display().to_string(), |n| {
                        n.to_string_lossy().into_owned()
                    });
                self.line(&format!("Archive: {name} ({})", Self::totals(manifest)));
                self.line("");
                for entry in &manifest.entries {
                    let target = entry
                        .link_name
                        .map(|label| format!(" -> {label}"))
                        .unwrap_or_default();
                    self.line(&format!(
                        "{} {:>8} {} {}{target}",
                        Self::format_mode(entry.mode, Self::kind_char(entry.kind)),
                        Self::format_size(entry.size),
                        Self::format_time(entry.modified),
                        entry.name
                    ));
                }
                self.line("");
                self.line(&format!("Summary: {}", Self::totals(manifest)));
            }
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("WARNING: {message}"));
        }
    }
}
