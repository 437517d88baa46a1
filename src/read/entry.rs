//! Archive entry type.

use crate::archive_path::{CLASS_SUFFIX, ClassName};
use crate::checksum::Crc32;
use crate::codec;
use crate::format::{CentralRecord, FLAG_DATA_DESCRIPTOR, FLAG_ENCRYPTED};
use crate::timestamp::DosDateTime;
use crate::{Error, Result};

/// An entry read from a ZIP archive.
///
/// The payload is kept exactly as stored (usually deflated) so that entries
/// which pass through a bake unchanged are written back byte for byte, with
/// their header metadata intact. Call [`data()`](Self::data) to decode it.
///
/// This struct is marked `#[non_exhaustive]` to allow adding new fields
/// in future versions without breaking downstream code.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ArchiveEntry {
    /// The path within the archive, `/`-separated.
    pub path: String,
    /// Entry comment from the central directory, if any.
    pub comment: Option<String>,
    /// Last-modified timestamp.
    pub modified: DosDateTime,
    /// Whether this entry is a directory (name ends with `/`).
    pub is_directory: bool,
    /// ZIP compression method number.
    pub method: u16,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Stored payload size in bytes.
    pub compressed_size: u64,
    /// Uncompressed size in bytes.
    pub size: u64,
    pub(crate) name: Vec<u8>,
    pub(crate) raw_comment: Vec<u8>,
    pub(crate) flags: u16,
    pub(crate) version_made_by: u16,
    pub(crate) version_needed: u16,
    pub(crate) internal_attributes: u16,
    pub(crate) external_attributes: u32,
    pub(crate) local_extra: Vec<u8>,
    pub(crate) central_extra: Vec<u8>,
    pub(crate) payload: Vec<u8>,
}

impl ArchiveEntry {
    pub(crate) fn from_parts(record: CentralRecord, local_extra: Vec<u8>, payload: Vec<u8>) -> Self {
        let path = decode_text(&record.name);
        let comment = if record.comment.is_empty() {
            None
        } else {
            Some(decode_text(&record.comment))
        };

        Self {
            is_directory: path.ends_with('/'),
            path,
            comment,
            modified: DosDateTime::from_raw(record.date, record.time),
            method: record.method,
            crc32: record.crc32,
            compressed_size: u64::from(record.compressed_size),
            size: u64::from(record.size),
            name: record.name,
            raw_comment: record.comment,
            flags: record.flags,
            version_made_by: record.version_made_by,
            version_needed: record.version_needed,
            internal_attributes: record.internal_attributes,
            external_attributes: record.external_attributes,
            local_extra,
            central_extra: record.extra,
            payload,
        }
    }

    /// Returns true for regular (non-directory) entries ending in `.class`.
    pub fn is_class(&self) -> bool {
        !self.is_directory && self.path.ends_with(CLASS_SUFFIX)
    }

    /// Returns the class name for class entries.
    pub fn class_name(&self) -> Option<ClassName> {
        if self.is_directory {
            return None;
        }
        ClassName::from_entry_path(&self.path)
    }

    /// Returns true if the payload is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    /// Returns true if the source archive streamed this entry with a trailing
    /// data descriptor.
    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    /// The name exactly as stored in the archive.
    pub fn name_bytes(&self) -> &[u8] {
        &self.name
    }

    /// The payload exactly as stored in the archive.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Decodes the payload and verifies its size and CRC-32.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedFeature`] for encrypted entries
    /// - [`Error::UnsupportedMethod`] for methods other than Stored/Deflated
    /// - [`Error::CorruptData`] if a Deflate stream cannot be decoded
    /// - [`Error::CrcMismatch`] if the decoded data is damaged
    pub fn data(&self) -> Result<Vec<u8>> {
        if self.is_encrypted() {
            return Err(Error::UnsupportedFeature {
                feature: "encrypted entries",
            });
        }

        let data = codec::decode(self.method, &self.payload, self.size).map_err(|e| match e {
            Error::CorruptData(reason) => Error::CorruptData(format!("'{}': {}", self.path, reason)),
            other => other,
        })?;
        if data.len() as u64 != self.size {
            return Err(Error::CrcMismatch {
                entry_name: self.path.clone(),
                expected: self.crc32,
                actual: Crc32::compute(&data),
            });
        }

        let actual = Crc32::compute(&data);
        if actual != self.crc32 {
            return Err(Error::CrcMismatch {
                entry_name: self.path.clone(),
                expected: self.crc32,
                actual,
            });
        }

        Ok(data)
    }

    /// Central directory header for writing this entry at `offset`.
    pub(crate) fn central_record(&self, flags: u16, offset: u32) -> CentralRecord {
        let (date, time) = self.modified.to_raw();
        CentralRecord {
            version_made_by: self.version_made_by,
            version_needed: self.version_needed,
            flags,
            method: self.method,
            time,
            date,
            crc32: self.crc32,
            compressed_size: self.compressed_size as u32,
            size: self.size as u32,
            name: self.name.clone(),
            extra: self.central_extra.clone(),
            comment: self.raw_comment.clone(),
            internal_attributes: self.internal_attributes,
            external_attributes: self.external_attributes,
            local_header_offset: offset,
        }
    }
}

/// Decodes a name or comment.
///
/// Names without the UTF-8 flag are nominally CP437, but JAR tooling writes
/// UTF-8 regardless, so both are decoded as UTF-8 (lossily).
fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CompressionMethod, encode};

    fn entry(name: &str, data: &[u8], method: CompressionMethod) -> ArchiveEntry {
        let payload = encode(method, data, 6).unwrap();
        let record = CentralRecord {
            version_made_by: 20,
            version_needed: 20,
            flags: 0,
            method: method.id(),
            time: 0,
            date: 0x21,
            crc32: Crc32::compute(data),
            compressed_size: payload.len() as u32,
            size: data.len() as u32,
            name: name.as_bytes().to_vec(),
            extra: vec![],
            comment: vec![],
            internal_attributes: 0,
            external_attributes: 0,
            local_header_offset: 0,
        };
        ArchiveEntry::from_parts(record, vec![], payload)
    }

    #[test]
    fn test_classification() {
        let class = entry("net/Foo.class", b"", CompressionMethod::Stored);
        assert!(class.is_class());
        assert_eq!(class.class_name().unwrap().as_str(), "net.Foo");

        let dir = entry("weird.class/", b"", CompressionMethod::Stored);
        assert!(dir.is_directory);
        assert!(!dir.is_class());
        assert!(dir.class_name().is_none());

        let other = entry("assets/lang/en_us.json", b"{}", CompressionMethod::Deflated);
        assert!(!other.is_class());
        assert!(other.comment.is_none());
    }

    #[test]
    fn test_data_deflated() {
        let e = entry("a.txt", b"hello hello hello hello", CompressionMethod::Deflated);
        assert_eq!(e.data().unwrap(), b"hello hello hello hello");
    }

    #[test]
    fn test_data_crc_mismatch() {
        let mut e = entry("a.txt", b"hello", CompressionMethod::Stored);
        e.crc32 ^= 1;
        assert!(matches!(e.data(), Err(Error::CrcMismatch { .. })));
    }

    #[test]
    fn test_data_size_mismatch() {
        let mut e = entry("a.txt", b"hello", CompressionMethod::Stored);
        e.size = 3;
        assert!(matches!(e.data(), Err(Error::CrcMismatch { .. })));
    }

    #[test]
    fn test_data_corrupt_deflate_names_entry() {
        let mut e = entry("net/Foo.class", b"class bytes", CompressionMethod::Deflated);
        e.payload[0] = 0xFF;
        match e.data() {
            Err(Error::CorruptData(reason)) => assert!(reason.starts_with("'net/Foo.class'")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_data_encrypted() {
        let mut e = entry("a.txt", b"hello", CompressionMethod::Stored);
        e.flags |= FLAG_ENCRYPTED;
        assert!(matches!(e.data(), Err(Error::UnsupportedFeature { .. })));
    }
}
