//! Payload codecs for ZIP entries.
//!
//! JAR files only use two methods in practice: Stored (0) and Deflated (8).
//! Anything else is still carried through untouched by the raw copy path,
//! but cannot be decoded.

pub mod deflate;

use std::io::{self, Read};

use crate::{Error, Result};

pub use deflate::{DeflateDecoder, DeflateEncoder, DeflateEncoderOptions};

/// ZIP method number for uncompressed entries.
pub const METHOD_STORED: u16 = 0;
/// ZIP method number for raw Deflate entries.
pub const METHOD_DEFLATED: u16 = 8;

/// Compression methods this crate can both read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum CompressionMethod {
    /// No compression.
    Stored,
    /// Raw Deflate (RFC 1951), the JAR default.
    #[default]
    Deflated,
}

impl CompressionMethod {
    /// Maps a ZIP method number to a known method.
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            METHOD_STORED => Some(Self::Stored),
            METHOD_DEFLATED => Some(Self::Deflated),
            _ => None,
        }
    }

    /// Returns the ZIP method number.
    pub fn id(self) -> u16 {
        match self {
            Self::Stored => METHOD_STORED,
            Self::Deflated => METHOD_DEFLATED,
        }
    }
}

/// Decodes an entry payload.
///
/// At most `limit + 1` bytes are produced so a caller can detect payloads
/// that inflate past the size recorded in the header.
pub fn decode(method_id: u16, payload: &[u8], limit: u64) -> Result<Vec<u8>> {
    let method = CompressionMethod::from_id(method_id).ok_or(Error::UnsupportedMethod {
        method: method_id,
    })?;
    let capacity = usize::try_from(limit).unwrap_or(usize::MAX).min(1 << 24);
    let mut out = Vec::with_capacity(capacity);
    match method {
        CompressionMethod::Stored => {
            io::Cursor::new(payload)
                .take(limit.saturating_add(1))
                .read_to_end(&mut out)?;
        }
        CompressionMethod::Deflated => {
            // The payload is in memory, so any failure is a broken stream.
            DeflateDecoder::new(payload)
                .take(limit.saturating_add(1))
                .read_to_end(&mut out)
                .map_err(|e| Error::CorruptData(format!("deflate stream: {}", e)))?;
        }
    }
    Ok(out)
}

/// Encodes an entry payload with the given method.
pub fn encode(method: CompressionMethod, data: &[u8], level: u32) -> Result<Vec<u8>> {
    match method {
        CompressionMethod::Stored => Ok(data.to_vec()),
        CompressionMethod::Deflated => {
            let options = DeflateEncoderOptions::with_level(level);
            let mut encoder = DeflateEncoder::new(Vec::with_capacity(data.len() / 2), &options);
            io::Write::write_all(&mut encoder, data)?;
            Ok(encoder.try_finish()?)
        }
    }
}
