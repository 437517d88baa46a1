//! `Runtime[In]VisibleAnnotations` attribute filtering.
//!
//! ```text
//! annotation {
//!     u2 type_index;
//!     u2 num_element_value_pairs;
//!     { u2 element_name_index; element_value value; } pairs[num_element_value_pairs];
//! }
//! ```
//!
//! Annotations are never decoded beyond finding where each one ends; kept
//! annotations are copied as the exact byte span they occupied.

use super::constant_pool::ConstantPool;
use super::reader::ClassCursor;
use crate::{Error, Result};

/// Maximum depth of nested annotation and array element values.
pub(crate) const MAX_NESTING: usize = 256;

/// Outcome of filtering one annotations attribute body.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Filtered {
    /// Nothing matched; the attribute can be copied as is.
    Unchanged,
    /// Every annotation matched; the attribute should be dropped.
    Empty { removed: usize },
    /// Some annotations matched; this is the new attribute body.
    Rewritten { body: Vec<u8>, removed: usize },
}

/// Filters the annotations of one attribute body.
///
/// `base` is the offset of `body` within the class file and is used only in
/// error reports.
pub(crate) fn filter<F>(
    body: &[u8],
    base: usize,
    pool: &ConstantPool<'_>,
    should_strip: &mut F,
) -> Result<Filtered>
where
    F: FnMut(&str) -> bool,
{
    let mut c = ClassCursor::with_base(body, base);
    let count = c.u16("annotation count")?;

    let mut kept: Vec<&[u8]> = Vec::with_capacity(usize::from(count));
    let mut removed = 0usize;
    for _ in 0..count {
        let start = c.pos();
        let type_offset = c.offset();
        let type_index = c.u16("annotation type index")?;
        skip_pairs(&mut c, 0)?;

        let descriptor = pool.require_utf8(type_index, type_offset, "annotation type")?;
        if should_strip(&String::from_utf8_lossy(descriptor)) {
            removed += 1;
        } else {
            kept.push(c.span(start, c.pos()));
        }
    }

    if c.remaining() != 0 {
        return Err(Error::class_format(
            c.offset(),
            format!(
                "{} trailing bytes after {} annotations",
                c.remaining(),
                count
            ),
        ));
    }

    if removed == 0 {
        return Ok(Filtered::Unchanged);
    }
    if kept.is_empty() {
        return Ok(Filtered::Empty { removed });
    }

    let mut rewritten = Vec::with_capacity(body.len());
    // kept.len() < count, so this fits in a u16
    rewritten.extend_from_slice(&(kept.len() as u16).to_be_bytes());
    for span in kept {
        rewritten.extend_from_slice(span);
    }
    Ok(Filtered::Rewritten {
        body: rewritten,
        removed,
    })
}

fn skip_pairs(c: &mut ClassCursor<'_>, depth: usize) -> Result<()> {
    let pairs = c.u16("element value pair count")?;
    for _ in 0..pairs {
        c.u16("element name index")?;
        skip_element_value(c, depth)?;
    }
    Ok(())
}

fn skip_element_value(c: &mut ClassCursor<'_>, depth: usize) -> Result<()> {
    if depth >= MAX_NESTING {
        return Err(Error::class_format(
            c.offset(),
            format!("annotation values nested deeper than {}", MAX_NESTING),
        ));
    }

    let offset = c.offset();
    match c.u8("element value tag")? {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' | b'c' => {
            c.u16("constant value index")?;
        }
        b'e' => {
            c.u16("enum type name index")?;
            c.u16("enum constant name index")?;
        }
        b'@' => {
            c.u16("annotation type index")?;
            skip_pairs(c, depth + 1)?;
        }
        b'[' => {
            let values = c.u16("array length")?;
            for _ in 0..values {
                skip_element_value(c, depth + 1)?;
            }
        }
        tag => {
            return Err(Error::class_format(
                offset,
                format!("unknown element value tag {:#04x}", tag),
            ));
        }
    }
    Ok(())
}
