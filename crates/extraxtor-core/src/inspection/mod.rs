//! Read-only views of archives and extracted trees.
//!
//! # Examples
//!
//! ```no_run
//! use extraxtor_core::list_archive;
//! use extraxtor_core::inspection::tree_listing;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // List archive contents
//! let manifest = list_archive(Path::new("archive.tar.gz"))?;
//! println!("Archive contains {} entries", manifest.total_entries);
//!
//! // Show what an extraction produced
//! let tree = tree_listing(Path::new("out"), 4, 50)?;
//! for entry in &tree.entries {
//!     println!("{}{}", "  ".repeat(entry.depth), entry.name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod list;
pub mod tree;

pub use list::ArchiveManifest;
pub use list::ManifestEntry;
pub use list::SYMLINK_LABEL;
pub use list::list_archive;
pub use tree::DEFAULT_TREE_DEPTH;
pub use tree::DEFAULT_TREE_ITEMS;
pub use tree::DirListingEntry;
pub use tree::TreeEntry;
pub use tree::TreeListing;
pub use tree::dir_listing;
pub use tree::tree_listing;
