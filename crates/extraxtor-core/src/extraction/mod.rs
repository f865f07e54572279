//! Concurrent extraction of archive entries.

pub mod engine;
pub mod entry;
pub mod permits;

pub use engine::ExtractionEngine;
pub use permits::CopyPermits;
