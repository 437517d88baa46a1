//! Fuzz target for the class-file annotation filter.
//!
//! Run with: cargo +nightly fuzz run class_filter
//!
//! Properties being tested:
//! - Malformed class files are rejected without panicking
//! - Filtering an already filtered class changes nothing

#![no_main]

use libfuzzer_sys::fuzz_target;
use prebake::classfile::{is_internal_metadata, strip_annotations};

fuzz_target!(|data: &[u8]| {
    let Ok(once) = strip_annotations(data, is_internal_metadata) else {
        return;
    };
    let twice = strip_annotations(&once.bytes, is_internal_metadata)
        .expect("filtered class must stay well-formed");
    assert_eq!(twice.removed, 0);
    assert_eq!(twice.bytes, once.bytes);
});
