//! Big-endian cursor over class-file bytes.

use crate::{Error, Result};

/// Bounds-checked reader; every failure reports the absolute offset.
#[derive(Debug, Clone)]
pub(crate) struct ClassCursor<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ClassCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base(data, 0)
    }

    /// A cursor over a sub-slice that starts at `base` in the enclosing class.
    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    /// Position relative to the start of this cursor's slice.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Position in the enclosing class file.
    #[inline]
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// The bytes between two relative positions.
    pub fn span(&self, start: usize, end: usize) -> &'a [u8] {
        &self.data[start..end]
    }

    pub fn u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    pub fn u16(&mut self, what: &str) -> Result<u16> {
        let b = self.take(2, what)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self, what: &str) -> Result<u32> {
        let b = self.take(4, what)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::class_format(
                self.offset(),
                format!(
                    "truncated {}: need {} bytes, {} left",
                    what,
                    len,
                    self.remaining()
                ),
            ));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_reads() {
        let mut c = ClassCursor::new(&[0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x34, 0x07]);
        assert_eq!(c.u32("magic").unwrap(), 0xCAFEBABE);
        assert_eq!(c.u16("major").unwrap(), 52);
        assert_eq!(c.u8("tag").unwrap(), 7);
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn test_truncation_reports_absolute_offset() {
        let mut c = ClassCursor::with_base(&[0x00], 100);
        let err = c.u16("attribute count").unwrap_err();
        assert!(matches!(err, Error::ClassFormat { offset: 100, .. }));
        assert!(err.to_string().contains("attribute count"));
    }

    #[test]
    fn test_span() {
        let mut c = ClassCursor::new(b"abcdef");
        c.take(2, "x").unwrap();
        let start = c.pos();
        c.take(3, "y").unwrap();
        assert_eq!(c.span(start, c.pos()), b"cde");
        assert_eq!(c.offset(), 5);
    }
}
