//! Type-safe wrappers for archive extraction operations.
//!
//! Path types are validated upon construction and cannot be created from
//! raw types without going through validation:
//!
//! - [`DestDir`]: canonical, existing output root
//! - [`SafePath`]: entry name proven to stay inside a `DestDir`
//!
//! Entry types describe what a format adapter hands to the engine.

pub mod dest_dir;
pub mod entry;
pub mod safe_path;

pub use dest_dir::DestDir;
pub use entry::ArchiveEntry;
pub use entry::EntryKind;
pub use entry::EntryMeta;
pub use safe_path::SafePath;
