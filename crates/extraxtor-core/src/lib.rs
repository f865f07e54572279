//! Concurrent, path-safe archive extraction with directory flattening.
//!
//! `extraxtor-core` extracts tar (plain, gzip, bzip2, xz, zstd) and zip
//! archives with a bounded worker pool. Every entry name is validated
//! against the output root before anything is written, so entries such as
//! `../../etc/passwd` are rejected and reported instead of escaping.
//!
//! After extraction, redundant single-directory wrappers
//! (`project-1.0/project-1.0/...`) can be collapsed. This happens in a
//! private staging directory whose contents are then moved into the
//! output.
//!
//! # Examples
//!
//! ```no_run
//! use extraxtor_core::ExtractConfig;
//! use extraxtor_core::extract_archive;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractConfig::default();
//! let report = extract_archive(Path::new("archive.tar.gz"), Some(Path::new("/output/dir")), &config)?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod cancel;
pub mod config;
pub mod copy;
pub mod error;
pub mod extraction;
pub mod flatten;
pub mod formats;
pub mod inspection;
pub mod report;
pub mod staging;
pub mod stats;
pub mod types;
pub mod validation;

// Re-export main API types
pub use api::count_entries;
pub use api::extract_archive;
pub use api::extract_archive_with_progress;
pub use cancel::CancellationToken;
pub use config::ExtractConfig;
pub use error::ExtractionError;
pub use error::Result;
pub use error::ValidationError;
pub use flatten::FlattenOutcome;
pub use flatten::Flattener;
pub use formats::detect::ArchiveType;
pub use inspection::ArchiveManifest;
pub use inspection::ManifestEntry;
pub use inspection::list_archive;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;

// Re-export types module for easier access
pub use types::DestDir;
pub use types::EntryKind;
pub use types::SafePath;
