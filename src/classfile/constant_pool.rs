//! Constant pool walking.
//!
//! Only `CONSTANT_Utf8` values are retained; every other tag is skipped by
//! its fixed size. The pool itself is never rewritten.

use super::reader::ClassCursor;
use crate::{Error, Result};

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

/// Utf8 entries of a constant pool, indexed by constant index.
#[derive(Debug)]
pub(crate) struct ConstantPool<'a> {
    utf8: Vec<Option<&'a [u8]>>,
}

impl<'a> ConstantPool<'a> {
    /// Reads `constant_pool_count` and the entries that follow it.
    pub fn parse(c: &mut ClassCursor<'a>) -> Result<Self> {
        let count = c.u16("constant pool count")?;
        let mut utf8 = vec![None; usize::from(count)];

        // Index 0 is unused; Long and Double occupy two slots.
        let mut index = 1usize;
        while index < usize::from(count) {
            let offset = c.offset();
            let tag = c.u8("constant tag")?;
            let width = match tag {
                TAG_UTF8 => {
                    let len = c.u16("Utf8 length")?;
                    utf8[index] = Some(c.take(usize::from(len), "Utf8 bytes")?);
                    0
                }
                TAG_CLASS | TAG_STRING | TAG_METHOD_TYPE | TAG_MODULE | TAG_PACKAGE => 2,
                TAG_METHOD_HANDLE => 3,
                TAG_INTEGER
                | TAG_FLOAT
                | TAG_FIELDREF
                | TAG_METHODREF
                | TAG_INTERFACE_METHODREF
                | TAG_NAME_AND_TYPE
                | TAG_DYNAMIC
                | TAG_INVOKE_DYNAMIC => 4,
                TAG_LONG | TAG_DOUBLE => {
                    c.take(8, "wide constant")?;
                    index += 2;
                    continue;
                }
                other => {
                    return Err(Error::class_format(
                        offset,
                        format!("unknown constant pool tag {} at index {}", other, index),
                    ));
                }
            };
            c.take(width, "constant")?;
            index += 1;
        }

        Ok(Self { utf8 })
    }

    /// Returns the bytes of a Utf8 constant.
    pub fn utf8(&self, index: u16) -> Option<&'a [u8]> {
        self.utf8.get(usize::from(index)).copied().flatten()
    }

    /// Like [`utf8`](Self::utf8) but fails with a decode error.
    pub fn require_utf8(&self, index: u16, offset: usize, what: &str) -> Result<&'a [u8]> {
        self.utf8(index).ok_or_else(|| {
            Error::class_format(
                offset,
                format!("{} index {} is not a Utf8 constant", what, index),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_bytes() -> Vec<u8> {
        let mut b = vec![0x00, 0x07]; // count = 7 -> indices 1..=6
        b.extend([TAG_UTF8, 0x00, 0x03]);
        b.extend(b"Foo");
        b.extend([TAG_CLASS, 0x00, 0x01]);
        b.extend([TAG_LONG, 0, 0, 0, 0, 0, 0, 0, 42]); // indices 3 and 4
        b.extend([TAG_METHOD_HANDLE, 6, 0x00, 0x02]);
        b.extend([TAG_UTF8, 0x00, 0x00]);
        b
    }

    #[test]
    fn test_parse_mixed_pool() {
        let bytes = pool_bytes();
        let mut c = ClassCursor::new(&bytes);
        let pool = ConstantPool::parse(&mut c).unwrap();
        assert_eq!(c.remaining(), 0);
        assert_eq!(pool.utf8(1), Some(&b"Foo"[..]));
        assert_eq!(pool.utf8(2), None);
        assert_eq!(pool.utf8(3), None);
        assert_eq!(pool.utf8(6), Some(&b""[..]));
        assert_eq!(pool.utf8(0), None);
        assert_eq!(pool.utf8(500), None);
    }

    #[test]
    fn test_unknown_tag() {
        let bytes = [0x00, 0x02, 99];
        let err = ConstantPool::parse(&mut ClassCursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::ClassFormat { offset: 2, .. }));
        assert!(err.to_string().contains("unknown constant pool tag 99"));
    }

    #[test]
    fn test_require_utf8() {
        let bytes = pool_bytes();
        let pool = ConstantPool::parse(&mut ClassCursor::new(&bytes)).unwrap();
        assert!(pool.require_utf8(1, 0, "name").is_ok());
        let err = pool.require_utf8(2, 17, "type").unwrap_err();
        assert!(err.to_string().contains("type index 2"));
    }
}
