//! Per-entry write options.

use crate::codec::CompressionMethod;
use crate::timestamp::DosDateTime;

/// Metadata for an entry written from fresh bytes.
///
/// # Example
///
/// ```rust
/// use prebake::write::EntryMeta;
/// use prebake::codec::CompressionMethod;
///
/// let meta = EntryMeta::default()
///     .method(CompressionMethod::Stored)
///     .comment("generated");
/// assert_eq!(meta.method, CompressionMethod::Stored);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct EntryMeta {
    /// Compression method (Deflated by default).
    pub method: CompressionMethod,
    /// Deflate level 0-9; `None` uses the codec default of 6.
    pub level: Option<u32>,
    /// Last-modified timestamp; `None` stamps the entry with the time it is written.
    pub modified: Option<DosDateTime>,
    /// Entry comment.
    pub comment: Option<String>,
}

impl EntryMeta {
    /// Sets the compression method.
    pub fn method(mut self, method: CompressionMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the Deflate level (clamped to 9).
    pub fn level(mut self, level: u32) -> Self {
        self.level = Some(level.min(9));
        self
    }

    /// Sets a fixed last-modified timestamp.
    pub fn modified(mut self, modified: DosDateTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Sets the entry comment.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub(crate) fn effective_level(&self) -> u32 {
        self.level.unwrap_or(6)
    }
}
