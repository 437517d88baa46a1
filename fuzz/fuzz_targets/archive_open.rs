//! Fuzz target for Archive::open with arbitrary byte input.
//!
//! Exercises end-of-central-directory search, central and local header
//! parsing, and payload decoding with malformed or adversarial input.
//!
//! Run with: cargo +nightly fuzz run archive_open

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // We don't care about the result - we're looking for panics or hangs
    let Ok(mut archive) = prebake::Archive::open(Cursor::new(data)) else {
        return;
    };

    while let Ok(Some(entry)) = archive.next_entry() {
        let _ = entry.class_name();
        // Decoding verifies size and CRC; errors are expected, panics are not
        let _ = entry.data();
    }
});
