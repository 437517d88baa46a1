//! Deflate codec implementation.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder as FlateDecoder;
use flate2::write::DeflateEncoder as FlateEncoder;

use super::CompressionMethod;

/// Raw Deflate decoder over an in-memory or streamed payload.
pub struct DeflateDecoder<R> {
    inner: FlateDecoder<R>,
}

impl<R> std::fmt::Debug for DeflateDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeflateDecoder").finish_non_exhaustive()
    }
}

impl<R: Read> DeflateDecoder<R> {
    /// Creates a new Deflate decoder.
    pub fn new(input: R) -> Self {
        Self {
            inner: FlateDecoder::new(input),
        }
    }

    /// Method this decoder handles.
    pub fn method(&self) -> CompressionMethod {
        CompressionMethod::Deflated
    }
}

impl<R: Read> Read for DeflateDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// Deflate encoder options.
#[derive(Debug, Clone)]
pub struct DeflateEncoderOptions {
    /// Compression level (0-9, default 6).
    pub level: u32,
}

impl Default for DeflateEncoderOptions {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl DeflateEncoderOptions {
    /// Creates options with the given compression level, clamped to 9.
    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }
}

/// Raw Deflate encoder.
pub struct DeflateEncoder<W: Write> {
    inner: FlateEncoder<W>,
}

impl<W: Write> std::fmt::Debug for DeflateEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeflateEncoder").finish_non_exhaustive()
    }
}

impl<W: Write> DeflateEncoder<W> {
    /// Creates a new Deflate encoder.
    pub fn new(output: W, options: &DeflateEncoderOptions) -> Self {
        Self {
            inner: FlateEncoder::new(output, Compression::new(options.level)),
        }
    }

    /// Finishes encoding and returns the underlying writer.
    pub fn try_finish(self) -> io::Result<W> {
        self.inner.finish()
    }
}

impl<W: Write> Write for DeflateEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
