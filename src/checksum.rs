//! Checksum and byte-counting utilities for ZIP entries.
//!
//! ZIP stores an IEEE CRC-32 of the uncompressed data in both the local and
//! central headers of every entry.
//!
//! # Example
//!
//! ```rust
//! use prebake::checksum::Crc32;
//!
//! let mut crc = Crc32::new();
//! crc.update(b"Hello, ");
//! crc.update(b"World!");
//! assert_eq!(crc.finalize(), Crc32::compute(b"Hello, World!"));
//! ```

use std::io::{self, Write};

/// CRC-32 checksum calculator.
///
/// Uses the IEEE 802.3 polynomial, the one ZIP archives use.
///
/// ```rust
/// use prebake::checksum::Crc32;
///
/// assert_eq!(Crc32::compute(b"Hello, World!"), 0xEC4AC3D0);
/// ```
#[derive(Clone, Default)]
pub struct Crc32 {
    hasher: crc32fast::Hasher,
}

impl std::fmt::Debug for Crc32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crc32")
            .field("current", &self.finalize())
            .finish()
    }
}

impl Crc32 {
    /// Creates a new checksum calculator.
    pub fn new() -> Self {
        Self {
            hasher: crc32fast::Hasher::new(),
        }
    }

    /// Updates the checksum with additional data.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Returns the checksum of everything seen so far.
    pub fn finalize(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// Computes the checksum of a single slice in one call.
    pub fn compute(data: &[u8]) -> u32 {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

/// A writer wrapper that tracks how many bytes went through it.
///
/// The ZIP writer uses the running count as the offset of each local header
/// and of the central directory, so the output only needs [`Write`].
///
/// ```rust
/// use prebake::checksum::CountingWriter;
/// use std::io::Write;
///
/// let mut writer = CountingWriter::new(Vec::new());
/// writer.write_all(b"PK").unwrap();
/// assert_eq!(writer.bytes_written(), 2);
/// ```
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W> CountingWriter<W> {
    /// Creates a new counting writer wrapping the given writer.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Returns the number of bytes written.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Consumes the wrapper, returning the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Returns a reference to the inner writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
