//! ZIP archive reading.
//!
//! [`Archive`] loads the central directory once, then hands out entries in
//! the order their data appears in the file, one at a time. Each entry is
//! read when requested and dropped by the caller when done with it, so a
//! bake never holds more than one payload in memory.
//!
//! # Example
//!
//! ```rust,no_run
//! use prebake::read::Archive;
//!
//! let mut archive = Archive::open_path("minecraft.jar")?;
//! while let Some(entry) = archive.next_entry()? {
//!     println!("{} ({} bytes)", entry.path, entry.size);
//! }
//! # Ok::<(), prebake::Error>(())
//! ```

mod entry;

pub use entry::ArchiveEntry;

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::format::reader::read_bytes;
use crate::format::{CentralRecord, EndOfCentralDirectory, LOCAL_HEADER_SIZE, LocalHeader};
use crate::{Error, Result};

/// A ZIP archive opened for reading.
pub struct Archive<R> {
    reader: R,
    records: Vec<CentralRecord>,
    directory_offset: u64,
    next: usize,
    comment: Vec<u8>,
}

impl<R> std::fmt::Debug for Archive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("entries", &self.records.len())
            .field("next", &self.next)
            .finish_non_exhaustive()
    }
}

impl Archive<BufReader<File>> {
    /// Opens an archive from a file path.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::open(BufReader::new(file))
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Opens an archive by locating and parsing its central directory.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFormat`] if no end-of-central-directory record exists
    /// - [`Error::CorruptHeader`] if the directory is truncated or inconsistent
    /// - [`Error::UnsupportedFeature`] for ZIP64 or multi-disk archives
    pub fn open(mut reader: R) -> Result<Self> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        let tail_len = file_len.min(EndOfCentralDirectory::MAX_SEARCH);
        let tail_start = file_len - tail_len;
        reader.seek(SeekFrom::Start(tail_start))?;
        let tail = read_bytes(&mut reader, tail_len as usize)?;

        let (eocd, eocd_offset) = EndOfCentralDirectory::find(&tail, tail_start)?;
        let directory_offset = u64::from(eocd.directory_offset);
        let directory_end = directory_offset + u64::from(eocd.directory_size);
        if directory_end > eocd_offset {
            return Err(Error::corrupt(
                eocd_offset,
                format!(
                    "central directory ({}..{}) overlaps end record",
                    directory_offset, directory_end
                ),
            ));
        }

        reader.seek(SeekFrom::Start(directory_offset))?;
        let directory = read_bytes(&mut reader, eocd.directory_size as usize)?;
        let mut cursor = directory.as_slice();
        let mut records = Vec::with_capacity(usize::from(eocd.entries));
        for _ in 0..eocd.entries {
            let offset = directory_offset + (directory.len() - cursor.len()) as u64;
            let record = CentralRecord::parse(&mut cursor, offset)?;
            if u64::from(record.local_header_offset) >= directory_offset {
                return Err(Error::corrupt(
                    offset,
                    format!(
                        "local header offset {} points past the entry data",
                        record.local_header_offset
                    ),
                ));
            }
            records.push(record);
        }

        // Hand entries out in the order their data is laid out, like a
        // streaming reader would see them.
        records.sort_by_key(|r| r.local_header_offset);

        log::debug!(
            "opened ZIP archive: {} entries, central directory at {:#x}",
            records.len(),
            directory_offset
        );

        Ok(Self {
            reader,
            records,
            directory_offset,
            next: 0,
            comment: eocd.comment,
        })
    }

    /// Reads the next entry, or returns `None` once every entry was read.
    pub fn next_entry(&mut self) -> Result<Option<ArchiveEntry>> {
        let Some(record) = self.records.get(self.next).cloned() else {
            return Ok(None);
        };
        self.next += 1;
        self.read_entry(record).map(Some)
    }

    /// Returns an iterator over the remaining entries.
    pub fn entries(&mut self) -> Entries<'_, R> {
        Entries { archive: self }
    }

    /// Looks up an entry by exact path, independent of the iteration cursor.
    pub fn by_name(&mut self, path: &str) -> Result<Option<ArchiveEntry>> {
        let Some(record) = self
            .records
            .iter()
            .find(|r| r.name == path.as_bytes())
            .cloned()
        else {
            return Ok(None);
        };
        self.read_entry(record).map(Some)
    }

    fn read_entry(&mut self, record: CentralRecord) -> Result<ArchiveEntry> {
        let offset = u64::from(record.local_header_offset);
        self.reader.seek(SeekFrom::Start(offset))?;
        let local = LocalHeader::parse(&mut self.reader, offset)?;

        let data_start = offset + LOCAL_HEADER_SIZE + (local.name.len() + local.extra.len()) as u64;
        let data_end = data_start + u64::from(record.compressed_size);
        if data_end > self.directory_offset {
            return Err(Error::corrupt(
                offset,
                format!(
                    "payload of '{}' runs into the central directory",
                    String::from_utf8_lossy(&record.name)
                ),
            ));
        }

        let payload = read_bytes(&mut self.reader, record.compressed_size as usize)
            .map_err(|_| Error::corrupt(data_start, "truncated entry payload"))?;
        Ok(ArchiveEntry::from_parts(record, local.extra, payload))
    }
}

impl<R> Archive<R> {
    /// Total number of entries in the archive.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Archive-level comment from the end record.
    pub fn comment(&self) -> &[u8] {
        &self.comment
    }

    /// Entry paths in iteration order.
    pub fn paths(&self) -> impl Iterator<Item = String> + '_ {
        self.records
            .iter()
            .map(|r| String::from_utf8_lossy(&r.name).into_owned())
    }
}

/// Iterator over the entries of an [`Archive`].
pub struct Entries<'a, R> {
    archive: &'a mut Archive<R>,
}

impl<R: Read + Seek> Iterator for Entries<'_, R> {
    type Item = Result<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.archive.next_entry().transpose()
    }
}
