//! Inspect command implementation

use crate::cli::InspectArgs;
use crate::error::add_archive_context;
use crate::output::ListingStyle;
use crate::output::OutputFormatter;
use anyhow::Result;
use extraxtor_core::list_archive;

pub fn execute(args: &InspectArgs, verbose: bool, formatter: &dyn OutputFormatter) -> Result<()> {
    let manifest = add_archive_context(list_archive(&args.archive), &args.archive)?;

    let style = if args.tree {
        ListingStyle::Tree
    } else if args.long || verbose {
        ListingStyle::Long
    } else {
        ListingStyle::Plain
    };

    formatter.format_manifest(&args.archive, &manifest, style)
}
