//! Class-file annotation filtering.
//!
//! The mixin transformer tags the classes it rewrites with bookkeeping
//! annotations under [`INTERNAL_METADATA_PREFIX`]. Those must not survive
//! into a baked jar, so every transformed class is passed through
//! [`strip_internal_metadata`] before it is written.
//!
//! The filter walks the class structure without building a tree: the
//! constant pool, interfaces, member headers and every attribute other than
//! the two runtime annotation attributes are copied byte for byte. The
//! constant pool is left as is, so descriptors of removed annotations stay
//! behind as unused Utf8 constants.
//!
//! Only annotations on the class itself, its fields and its methods are
//! considered. Parameter and type annotations are copied untouched.
//!
//! # Example
//!
//! ```rust,no_run
//! use prebake::classfile::strip_annotations;
//!
//! let class = std::fs::read("Foo.class")?;
//! let stripped = strip_annotations(&class, |desc| desc == "Ljava/lang/Deprecated;")?;
//! println!("removed {} annotations", stripped.removed);
//! # Ok::<(), prebake::Error>(())
//! ```

mod annotations;
mod constant_pool;
mod reader;

use annotations::Filtered;
use constant_pool::ConstantPool;
use reader::ClassCursor;

use crate::{Error, Result};

/// Descriptor prefix of the transformer's internal bookkeeping annotations.
pub const INTERNAL_METADATA_PREFIX: &str = "Lorg/spongepowered/asm/mixin/transformer/meta";

/// Class-file magic number.
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

const RUNTIME_VISIBLE_ANNOTATIONS: &[u8] = b"RuntimeVisibleAnnotations";
const RUNTIME_INVISIBLE_ANNOTATIONS: &[u8] = b"RuntimeInvisibleAnnotations";

/// A filtered class file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Stripped {
    /// The rewritten class bytes.
    pub bytes: Vec<u8>,
    /// Number of annotations removed across all scopes.
    pub removed: usize,
}

/// Removes class, field and method annotations whose type descriptor
/// matches `should_strip`.
///
/// Annotation attributes left without annotations are removed. A class with
/// no matching annotations comes back byte-identical.
///
/// # Errors
///
/// Returns [`Error::ClassFormat`] if the input is not a well-formed class
/// file or carries bytes after its last attribute.
pub fn strip_annotations<F>(class: &[u8], mut should_strip: F) -> Result<Stripped>
where
    F: FnMut(&str) -> bool,
{
    let mut c = ClassCursor::new(class);
    let magic = c.u32("magic")?;
    if magic != CLASS_MAGIC {
        return Err(Error::class_format(
            0,
            format!("bad magic {:#010x}", magic),
        ));
    }
    c.u16("minor version")?;
    c.u16("major version")?;
    let pool = ConstantPool::parse(&mut c)?;

    let mut walker = Walker {
        cursor: c,
        pool,
        out: Vec::with_capacity(class.len()),
        removed: 0,
    };
    walker.copy_to_cursor(class);

    // access_flags, this_class, super_class
    walker.copy(6, "class header")?;
    let interfaces = walker.copy_u16("interface count")?;
    walker.copy(usize::from(interfaces) * 2, "interfaces")?;

    for (count, what) in [("field count", "field"), ("method count", "method")] {
        let members = walker.copy_u16(count)?;
        for _ in 0..members {
            // access_flags, name_index, descriptor_index
            walker.copy(6, what)?;
            walker.filter_attributes(&mut should_strip)?;
        }
    }
    walker.filter_attributes(&mut should_strip)?;

    if walker.cursor.remaining() != 0 {
        return Err(Error::class_format(
            walker.cursor.offset(),
            format!("{} trailing bytes after class attributes", walker.cursor.remaining()),
        ));
    }

    Ok(Stripped {
        bytes: walker.out,
        removed: walker.removed,
    })
}

/// Removes the transformer's internal bookkeeping annotations.
///
/// Equivalent to [`strip_annotations`] with a predicate matching every
/// descriptor that starts with [`INTERNAL_METADATA_PREFIX`].
pub fn strip_internal_metadata(class: &[u8]) -> Result<Vec<u8>> {
    strip_annotations(class, is_internal_metadata).map(|s| s.bytes)
}

/// Returns true for descriptors under [`INTERNAL_METADATA_PREFIX`].
pub fn is_internal_metadata(descriptor: &str) -> bool {
    descriptor.starts_with(INTERNAL_METADATA_PREFIX)
}

struct Walker<'a> {
    cursor: ClassCursor<'a>,
    pool: ConstantPool<'a>,
    out: Vec<u8>,
    removed: usize,
}

impl<'a> Walker<'a> {
    /// Copies everything the cursor already consumed.
    fn copy_to_cursor(&mut self, class: &[u8]) {
        self.out.extend_from_slice(&class[..self.cursor.pos()]);
    }

    fn copy(&mut self, len: usize, what: &str) -> Result<()> {
        let bytes = self.cursor.take(len, what)?;
        self.out.extend_from_slice(bytes);
        Ok(())
    }

    fn copy_u16(&mut self, what: &str) -> Result<u16> {
        let value = self.cursor.u16(what)?;
        self.out.extend_from_slice(&value.to_be_bytes());
        Ok(value)
    }

    /// Copies an `attributes_count` + `attributes[]` table, filtering the
    /// runtime annotation attributes.
    fn filter_attributes<F>(&mut self, should_strip: &mut F) -> Result<()>
    where
        F: FnMut(&str) -> bool,
    {
        let count = self.cursor.u16("attribute count")?;
        let count_at = self.out.len();
        self.out.extend_from_slice(&count.to_be_bytes());

        let mut kept = count;
        for _ in 0..count {
            let start = self.cursor.pos();
            let name_offset = self.cursor.offset();
            let name_index = self.cursor.u16("attribute name index")?;
            let len = self.cursor.u32("attribute length")?;
            let body_offset = self.cursor.offset();
            let body = self.cursor.take(len as usize, "attribute")?;

            let name = self
                .pool
                .require_utf8(name_index, name_offset, "attribute name")?;
            let filtered = if name == RUNTIME_VISIBLE_ANNOTATIONS
                || name == RUNTIME_INVISIBLE_ANNOTATIONS
            {
                annotations::filter(body, body_offset, &self.pool, should_strip)?
            } else {
                Filtered::Unchanged
            };

            match filtered {
                Filtered::Unchanged => {
                    let raw = self.cursor.span(start, self.cursor.pos());
                    self.out.extend_from_slice(raw);
                }
                Filtered::Empty { removed } => {
                    self.removed += removed;
                    kept -= 1;
                }
                Filtered::Rewritten { body, removed } => {
                    self.removed += removed;
                    self.out.extend_from_slice(&name_index.to_be_bytes());
                    self.out.extend_from_slice(&(body.len() as u32).to_be_bytes());
                    self.out.extend_from_slice(&body);
                }
            }
        }

        if kept != count {
            self.out[count_at..count_at + 2].copy_from_slice(&kept.to_be_bytes());
        }
        Ok(())
    }
}
