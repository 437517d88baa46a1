//! ZIP archive writing.
//!
//! [`Writer`] streams entries to any [`Write`] sink. Offsets are tracked by
//! counting bytes, so the sink does not need to be seekable; the central
//! directory is emitted by [`Writer::finish`].
//!
//! Three ways to add an entry:
//!
//! - [`write_raw`](Writer::write_raw) copies an entry read from another
//!   archive byte for byte, without decompressing it.
//! - [`write_rewritten`](Writer::write_rewritten) replaces the payload of an
//!   entry read from another archive, keeping its name and comment.
//! - [`write_bytes`](Writer::write_bytes) adds a brand new entry.
//!
//! # Example
//!
//! ```rust
//! use prebake::ArchivePath;
//! use prebake::write::{EntryMeta, Writer};
//!
//! let mut writer = Writer::new(Vec::new());
//! writer.write_bytes(&ArchivePath::new("hello.txt")?, b"Hello, World!", &EntryMeta::default())?;
//! let bytes = writer.finish()?;
//! assert_eq!(&bytes[..4], b"PK\x03\x04");
//! # Ok::<(), prebake::Error>(())
//! ```

mod options;

pub use options::EntryMeta;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::checksum::{CountingWriter, Crc32};
use crate::codec::{self, CompressionMethod};
use crate::format::reader::write_u32_le;
use crate::format::{
    CentralRecord, DATA_DESCRIPTOR_SIGNATURE, DOS_DIRECTORY_ATTRIBUTE, EndOfCentralDirectory,
    FLAG_DATA_DESCRIPTOR, FLAG_UTF8, LocalHeader, VERSION_DEFLATED, VERSION_STORED,
};
use crate::read::ArchiveEntry;
use crate::timestamp::DosDateTime;
use crate::{ArchivePath, Error, Result};

/// A ZIP archive being written.
pub struct Writer<W: Write> {
    out: CountingWriter<W>,
    records: Vec<CentralRecord>,
}

impl<W: Write> std::fmt::Debug for Writer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Writer")
            .field("entries", &self.records.len())
            .field("bytes_written", &self.out.bytes_written())
            .finish_non_exhaustive()
    }
}

impl Writer<BufWriter<File>> {
    /// Creates (or truncates) an archive file.
    pub fn create_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Writer<W> {
    /// Creates a writer over the given sink.
    pub fn new(inner: W) -> Self {
        Self {
            out: CountingWriter::new(inner),
            records: Vec::new(),
        }
    }

    /// Number of entries written so far.
    pub fn entries_written(&self) -> usize {
        self.records.len()
    }

    /// Number of bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.out.bytes_written()
    }

    /// Copies an entry from another archive without recompressing it.
    ///
    /// Name, comment, timestamp, method, CRC, extra fields and attributes are
    /// all preserved. A trailing data descriptor is folded into the local
    /// header, except for encrypted entries whose check byte depends on it.
    pub fn write_raw(&mut self, entry: &ArchiveEntry) -> Result<()> {
        let offset = self.next_offset()?;
        let keep_descriptor = entry.is_encrypted() && entry.has_data_descriptor();
        let flags = if keep_descriptor {
            entry.flags
        } else {
            entry.flags & !FLAG_DATA_DESCRIPTOR
        };

        let (date, time) = entry.modified.to_raw();
        let (crc32, compressed_size, size) = if keep_descriptor {
            (0, 0, 0)
        } else {
            (entry.crc32, entry.compressed_size as u32, entry.size as u32)
        };
        LocalHeader {
            version_needed: entry.version_needed,
            flags,
            method: entry.method,
            time,
            date,
            crc32,
            compressed_size,
            size,
            name: entry.name.clone(),
            extra: entry.local_extra.clone(),
        }
        .write(&mut self.out)?;
        self.out.write_all(&entry.payload)?;

        if keep_descriptor {
            write_u32_le(&mut self.out, DATA_DESCRIPTOR_SIGNATURE)?;
            write_u32_le(&mut self.out, entry.crc32)?;
            write_u32_le(&mut self.out, entry.compressed_size as u32)?;
            write_u32_le(&mut self.out, entry.size as u32)?;
        }

        self.records.push(entry.central_record(flags, offset));
        Ok(())
    }

    /// Writes new content under the name and comment of `source`.
    ///
    /// Everything else (method, timestamp, attributes) comes from `meta`, so a
    /// default `meta` stamps the entry with the current time.
    pub fn write_rewritten(
        &mut self,
        source: &ArchiveEntry,
        data: &[u8],
        meta: &EntryMeta,
    ) -> Result<()> {
        self.write_new(
            source.name.clone(),
            source.raw_comment.clone(),
            data,
            meta,
            false,
        )
    }

    /// Writes a new file entry.
    pub fn write_bytes(&mut self, path: &ArchivePath, data: &[u8], meta: &EntryMeta) -> Result<()> {
        let comment = meta.comment.clone().unwrap_or_default().into_bytes();
        self.write_new(path.as_str().as_bytes().to_vec(), comment, data, meta, false)
    }

    /// Writes a new directory entry (the trailing `/` is added here).
    pub fn write_directory(&mut self, path: &ArchivePath, meta: &EntryMeta) -> Result<()> {
        let name = format!("{}/", path.as_str()).into_bytes();
        let comment = meta.comment.clone().unwrap_or_default().into_bytes();
        let meta = meta.clone().method(CompressionMethod::Stored);
        self.write_new(name, comment, &[], &meta, true)
    }

    fn write_new(
        &mut self,
        name: Vec<u8>,
        comment: Vec<u8>,
        data: &[u8],
        meta: &EntryMeta,
        directory: bool,
    ) -> Result<()> {
        let offset = self.next_offset()?;
        let payload = codec::encode(meta.method, data, meta.effective_level())?;
        let (Ok(size), Ok(compressed_size)) = (u32::try_from(data.len()), u32::try_from(payload.len()))
        else {
            return Err(Error::UnsupportedFeature { feature: "ZIP64" });
        };

        let flags = if name.is_ascii() && comment.is_ascii() {
            0
        } else {
            FLAG_UTF8
        };
        let version = match meta.method {
            CompressionMethod::Stored if !directory => VERSION_STORED,
            _ => VERSION_DEFLATED,
        };
        let (date, time) = meta.modified.unwrap_or_else(DosDateTime::now).to_raw();
        let crc32 = Crc32::compute(data);

        LocalHeader {
            version_needed: version,
            flags,
            method: meta.method.id(),
            time,
            date,
            crc32,
            compressed_size,
            size,
            name: name.clone(),
            extra: Vec::new(),
        }
        .write(&mut self.out)?;
        self.out.write_all(&payload)?;

        self.records.push(CentralRecord {
            version_made_by: version,
            version_needed: version,
            flags,
            method: meta.method.id(),
            time,
            date,
            crc32,
            compressed_size,
            size,
            name,
            extra: Vec::new(),
            comment,
            internal_attributes: 0,
            external_attributes: if directory { DOS_DIRECTORY_ATTRIBUTE } else { 0 },
            local_header_offset: offset,
        });
        Ok(())
    }

    fn next_offset(&self) -> Result<u32> {
        u32::try_from(self.out.bytes_written())
            .map_err(|_| Error::UnsupportedFeature { feature: "ZIP64" })
    }

    /// Writes the central directory and end record, returning the sink.
    pub fn finish(mut self) -> Result<W> {
        let entries = u16::try_from(self.records.len())
            .ok()
            .filter(|&n| n != u16::MAX)
            .ok_or(Error::UnsupportedFeature { feature: "ZIP64" })?;

        let directory_offset = self.next_offset()?;
        for record in &self.records {
            record.write(&mut self.out)?;
        }
        let directory_size = u32::try_from(self.out.bytes_written() - u64::from(directory_offset))
            .map_err(|_| Error::UnsupportedFeature { feature: "ZIP64" })?;

        EndOfCentralDirectory {
            entries,
            directory_size,
            directory_offset,
            comment: Vec::new(),
        }
        .write(&mut self.out)?;
        self.out.flush()?;

        log::debug!(
            "finished ZIP archive: {} entries, {} bytes",
            entries,
            self.out.bytes_written()
        );
        Ok(self.out.into_inner())
    }
}
