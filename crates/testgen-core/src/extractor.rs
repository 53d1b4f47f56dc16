use std::path::Path;

use crate::error::{GenError, Result};
use crate::types::HeaderDescriptor;

/// Trait implemented by each language front end that can describe a header.
pub trait DeclarationExtractor {
    /// Language name (e.g., "cpp")
    fn language(&self) -> &'static str;

    /// Describe declarations located in `path` whose contents are `source`.
    ///
    /// Never fails on malformed input: whatever declarations could be
    /// recovered are returned.
    fn extract_source(&self, path: &Path, source: &str) -> Result<HeaderDescriptor>;

    /// Read `path` from disk and describe it. I/O failures are errors.
    fn extract(&self, path: &Path) -> Result<HeaderDescriptor> {
        let bytes = std::fs::read(path).map_err(|e| GenError::io(path, e))?;
        let source = String::from_utf8_lossy(&bytes);
        self.extract_source(path, &source)
    }
}
