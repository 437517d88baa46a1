//! ZIP wire structures.
//!
//! A JAR is a plain ZIP archive:
//!
//! ```text
//! [local header 1][payload 1] ... [local header n][payload n]
//! [central header 1] ... [central header n]
//! [end of central directory]
//! ```
//!
//! The central directory is authoritative for sizes and CRCs; local headers
//! may carry zeros when the writer streamed the entry with a trailing data
//! descriptor. ZIP64 and multi-disk archives are not supported.

pub mod reader;

use std::io::{self, Read, Write};

use crate::{Error, Result};
use reader::{read_bytes, read_u16_le, read_u32_le, write_u16_le, write_u32_le};

/// Signature of a local file header (`PK\x03\x04`).
pub const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
/// Signature of a central directory header (`PK\x01\x02`).
pub const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
/// Signature of the end of central directory record (`PK\x05\x06`).
pub const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4b50;
/// Optional signature preceding a data descriptor (`PK\x07\x08`).
pub const DATA_DESCRIPTOR_SIGNATURE: u32 = 0x0807_4b50;

/// Fixed part of a local file header.
pub const LOCAL_HEADER_SIZE: u64 = 30;
/// Fixed part of a central directory header.
pub const CENTRAL_HEADER_SIZE: u64 = 46;
/// Fixed part of the end of central directory record.
pub const END_OF_CENTRAL_DIRECTORY_SIZE: u64 = 22;

/// General purpose flag: payload is encrypted.
pub const FLAG_ENCRYPTED: u16 = 0x0001;
/// General purpose flag: CRC and sizes follow the payload.
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;
/// General purpose flag: name and comment are UTF-8.
pub const FLAG_UTF8: u16 = 0x0800;

/// "Version needed to extract" for stored entries (1.0).
pub const VERSION_STORED: u16 = 10;
/// "Version needed to extract" for deflated entries and directories (2.0).
pub const VERSION_DEFLATED: u16 = 20;

/// MS-DOS directory attribute, set on directory entries.
pub const DOS_DIRECTORY_ATTRIBUTE: u32 = 0x10;

const ZIP64_MARKER: u32 = u32::MAX;

/// One central directory header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CentralRecord {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub method: u16,
    pub time: u16,
    pub date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub size: u32,
    pub name: Vec<u8>,
    pub extra: Vec<u8>,
    pub comment: Vec<u8>,
    pub internal_attributes: u16,
    pub external_attributes: u32,
    pub local_header_offset: u32,
}

impl CentralRecord {
    /// Parses one header; `offset` is only used for error reporting.
    pub fn parse<R: Read>(r: &mut R, offset: u64) -> Result<Self> {
        let signature = read_u32_le(r).map_err(|e| truncated(offset, e))?;
        if signature != CENTRAL_HEADER_SIGNATURE {
            return Err(Error::corrupt(
                offset,
                format!("expected central header signature, found {:#010x}", signature),
            ));
        }

        let parse_fixed = |r: &mut R| -> io::Result<[u32; 16]> {
            Ok([
                u32::from(read_u16_le(r)?), // version made by
                u32::from(read_u16_le(r)?), // version needed
                u32::from(read_u16_le(r)?), // flags
                u32::from(read_u16_le(r)?), // method
                u32::from(read_u16_le(r)?), // time
                u32::from(read_u16_le(r)?), // date
                read_u32_le(r)?,            // crc
                read_u32_le(r)?,            // compressed size
                read_u32_le(r)?,            // size
                u32::from(read_u16_le(r)?), // name length
                u32::from(read_u16_le(r)?), // extra length
                u32::from(read_u16_le(r)?), // comment length
                u32::from(read_u16_le(r)?), // disk number start
                u32::from(read_u16_le(r)?), // internal attributes
                read_u32_le(r)?,            // external attributes
                read_u32_le(r)?,            // local header offset
            ])
        };
        let f = parse_fixed(r).map_err(|e| truncated(offset, e))?;

        if f[12] != 0 {
            return Err(Error::UnsupportedFeature {
                feature: "multi-disk archives",
            });
        }
        if f[7] == ZIP64_MARKER || f[8] == ZIP64_MARKER || f[15] == ZIP64_MARKER {
            return Err(Error::UnsupportedFeature { feature: "ZIP64" });
        }

        let name = read_bytes(r, f[9] as usize).map_err(|e| truncated(offset, e))?;
        let extra = read_bytes(r, f[10] as usize).map_err(|e| truncated(offset, e))?;
        let comment = read_bytes(r, f[11] as usize).map_err(|e| truncated(offset, e))?;

        Ok(Self {
            version_made_by: f[0] as u16,
            version_needed: f[1] as u16,
            flags: f[2] as u16,
            method: f[3] as u16,
            time: f[4] as u16,
            date: f[5] as u16,
            crc32: f[6],
            compressed_size: f[7],
            size: f[8],
            name,
            extra,
            comment,
            internal_attributes: f[13] as u16,
            external_attributes: f[14],
            local_header_offset: f[15],
        })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_u32_le(w, CENTRAL_HEADER_SIGNATURE)?;
        write_u16_le(w, self.version_made_by)?;
        write_u16_le(w, self.version_needed)?;
        write_u16_le(w, self.flags)?;
        write_u16_le(w, self.method)?;
        write_u16_le(w, self.time)?;
        write_u16_le(w, self.date)?;
        write_u32_le(w, self.crc32)?;
        write_u32_le(w, self.compressed_size)?;
        write_u32_le(w, self.size)?;
        write_u16_le(w, self.name.len() as u16)?;
        write_u16_le(w, self.extra.len() as u16)?;
        write_u16_le(w, self.comment.len() as u16)?;
        write_u16_le(w, 0)?;
        write_u16_le(w, self.internal_attributes)?;
        write_u32_le(w, self.external_attributes)?;
        write_u32_le(w, self.local_header_offset)?;
        w.write_all(&self.name)?;
        w.write_all(&self.extra)?;
        w.write_all(&self.comment)
    }
}

/// One local file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocalHeader {
    pub version_needed: u16,
    pub flags: u16,
    pub method: u16,
    pub time: u16,
    pub date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub size: u32,
    pub name: Vec<u8>,
    pub extra: Vec<u8>,
}

impl LocalHeader {
    pub fn parse<R: Read>(r: &mut R, offset: u64) -> Result<Self> {
        let signature = read_u32_le(r).map_err(|e| truncated(offset, e))?;
        if signature != LOCAL_HEADER_SIGNATURE {
            return Err(Error::corrupt(
                offset,
                format!("expected local header signature, found {:#010x}", signature),
            ));
        }

        let parse_fixed = |r: &mut R| -> io::Result<([u16; 5], [u32; 3], u16, u16)> {
            let words = [
                read_u16_le(r)?,
                read_u16_le(r)?,
                read_u16_le(r)?,
                read_u16_le(r)?,
                read_u16_le(r)?,
            ];
            let dwords = [read_u32_le(r)?, read_u32_le(r)?, read_u32_le(r)?];
            Ok((words, dwords, read_u16_le(r)?, read_u16_le(r)?))
        };
        let (words, dwords, name_len, extra_len) =
            parse_fixed(r).map_err(|e| truncated(offset, e))?;

        let name = read_bytes(r, usize::from(name_len)).map_err(|e| truncated(offset, e))?;
        let extra = read_bytes(r, usize::from(extra_len)).map_err(|e| truncated(offset, e))?;

        Ok(Self {
            version_needed: words[0],
            flags: words[1],
            method: words[2],
            time: words[3],
            date: words[4],
            crc32: dwords[0],
            compressed_size: dwords[1],
            size: dwords[2],
            name,
            extra,
        })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_u32_le(w, LOCAL_HEADER_SIGNATURE)?;
        write_u16_le(w, self.version_needed)?;
        write_u16_le(w, self.flags)?;
        write_u16_le(w, self.method)?;
        write_u16_le(w, self.time)?;
        write_u16_le(w, self.date)?;
        write_u32_le(w, self.crc32)?;
        write_u32_le(w, self.compressed_size)?;
        write_u32_le(w, self.size)?;
        write_u16_le(w, self.name.len() as u16)?;
        write_u16_le(w, self.extra.len() as u16)?;
        w.write_all(&self.name)?;
        w.write_all(&self.extra)
    }
}

/// The end of central directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EndOfCentralDirectory {
    pub entries: u16,
    pub directory_size: u32,
    pub directory_offset: u32,
    pub comment: Vec<u8>,
}

impl EndOfCentralDirectory {
    /// Longest tail that can contain the record (fixed part plus a maximal comment).
    pub const MAX_SEARCH: u64 = END_OF_CENTRAL_DIRECTORY_SIZE + u16::MAX as u64;

    /// Scans `tail` backwards for the record.
    ///
    /// `tail_start` is the absolute offset of `tail[0]`. Returns the record and
    /// its absolute offset.
    pub fn find(tail: &[u8], tail_start: u64) -> Result<(Self, u64)> {
        let fixed = END_OF_CENTRAL_DIRECTORY_SIZE as usize;
        if tail.len() < fixed {
            return Err(Error::InvalidFormat(format!(
                "file too small for a ZIP archive ({} bytes)",
                tail.len()
            )));
        }

        let signature = END_OF_CENTRAL_DIRECTORY_SIGNATURE.to_le_bytes();
        let pos = (0..=tail.len() - fixed)
            .rev()
            .find(|&pos| tail[pos..pos + 4] == signature)
            .ok_or_else(|| {
                Error::InvalidFormat("end of central directory record not found".into())
            })?;

        let offset = tail_start + pos as u64;
        let mut r = &tail[pos + 4..];
        let parse_fixed = |r: &mut &[u8]| -> io::Result<[u32; 7]> {
            Ok([
                u32::from(read_u16_le(r)?), // this disk
                u32::from(read_u16_le(r)?), // directory disk
                u32::from(read_u16_le(r)?), // entries on this disk
                u32::from(read_u16_le(r)?), // entries total
                read_u32_le(r)?,            // directory size
                read_u32_le(r)?,            // directory offset
                u32::from(read_u16_le(r)?), // comment length
            ])
        };
        let f = parse_fixed(&mut r).map_err(|e| truncated(offset, e))?;

        if f[0] != 0 || f[1] != 0 || f[2] != f[3] {
            return Err(Error::UnsupportedFeature {
                feature: "multi-disk archives",
            });
        }
        if f[3] == u32::from(u16::MAX) || f[4] == ZIP64_MARKER || f[5] == ZIP64_MARKER {
            return Err(Error::UnsupportedFeature { feature: "ZIP64" });
        }

        // Tolerate a comment length that overruns the file; some tools get it wrong.
        let comment_len = (f[6] as usize).min(r.len());
        Ok((
            Self {
                entries: f[3] as u16,
                directory_size: f[4],
                directory_offset: f[5],
                comment: r[..comment_len].to_vec(),
            },
            offset,
        ))
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_u32_le(w, END_OF_CENTRAL_DIRECTORY_SIGNATURE)?;
        write_u16_le(w, 0)?;
        write_u16_le(w, 0)?;
        write_u16_le(w, self.entries)?;
        write_u16_le(w, self.entries)?;
        write_u32_le(w, self.directory_size)?;
        write_u32_le(w, self.directory_offset)?;
        write_u16_le(w, self.comment.len() as u16)?;
        w.write_all(&self.comment)
    }
}

fn truncated(offset: u64, err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::corrupt(offset, "truncated header")
    } else {
        Error::Io(err)
    }
}
