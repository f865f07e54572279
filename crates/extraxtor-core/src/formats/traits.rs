//! Common traits for archive format handlers.

use std::io::Read;
use std::ops::ControlFlow;

use crate::Result;
use crate::types::EntryMeta;

/// Handler invoked once per archive entry.
///
/// The reader yields the entry payload and is only valid for the duration of
/// the call. Returning `ControlFlow::Break` stops iteration.
pub type EntryHandler<'a> = dyn FnMut(EntryMeta, &mut dyn Read) -> ControlFlow<()> + 'a;

/// A sequential reader of archive entries.
pub trait EntrySource {
    /// Returns the archive format name.
    fn format_name(&self) -> &str;

    /// Feeds every entry to `handler` in archive order.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::InvalidArchive` when the archive cannot be
    /// decoded. Entries delivered before the failure stay delivered.
    fn for_each_entry(&mut self, handler: &mut EntryHandler<'_>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryKind;

    struct TestSource {
        names: Vec<&'static str>,
    }

    impl EntrySource for TestSource {
        fn format_name(&self) -> &str {
            "test"
        }

        fn for_each_entry(&mut self, handler: &mut EntryHandler<'_>) -> Result<()> {
            for name in &self.names {
                let meta = EntryMeta::new(*name, EntryKind::File, 0, 0o644);
                if handler(meta, &mut std::io::empty()).is_break() {
                    break;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_trait_implementation() {
        let mut source = TestSource {
            names: vec!["a", "b", "c"],
        };
        assert_eq!(source.format_name(), "test");

        let mut seen = Vec::new();
        source
            .for_each_entry(&mut |meta, _| {
                seen.push(meta.name);
                if seen.len() == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap_or_default();
        assert_eq!(seen, vec!["a".to_string(), "b".to_string()]);
    }
}
