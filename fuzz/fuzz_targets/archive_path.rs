//! Fuzz target for ArchivePath::new and ClassName derivation.
//!
//! Run with: cargo +nightly fuzz run archive_path
//!
//! Properties being tested:
//! - Accepted paths are relative, NUL-free and free of `.`/`..` segments
//! - Class names map back to the entry path they came from

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(path_str) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(path) = prebake::ArchivePath::new(path_str) {
        let accepted = path.as_str();
        assert!(!accepted.starts_with('/'), "Absolute path accepted: {:?}", accepted);
        assert!(!accepted.contains('\0'), "NUL byte accepted: {:?}", accepted);
        assert!(
            accepted.split('/').all(|s| s != ".." && s != "." && !s.is_empty()),
            "Bad segment accepted: {:?}",
            accepted
        );
    }

    if let Some(name) = prebake::ClassName::from_entry_path(path_str) {
        // Only dot-free stems round-trip
        let stem = &path_str[..path_str.len() - ".class".len()];
        if !stem.contains('.') {
            assert_eq!(name.to_entry_path(), path_str);
        }
    }
});
