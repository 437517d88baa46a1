//! Error types for prebake operations.
//!
//! This module provides the [`Error`] enum which represents every failure a
//! bake can run into, along with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. A bake
//! has no partial-success mode: the first error aborts the run and the output
//! archive must be treated as unusable.
//!
//! ```rust,no_run
//! use prebake::{BakeOptions, Error, PassThrough, bake_path, config::AppliedConfigs};
//!
//! fn run(input: &str, output: &str) -> prebake::Result<()> {
//!     let configs = AppliedConfigs::new();
//!     match bake_path(input, output, &mut PassThrough, &configs, BakeOptions::default()) {
//!         Ok(result) => {
//!             println!("{} classes transformed", result.classes_transformed.len());
//!             Ok(())
//!         }
//!         Err(Error::ClassFormat { offset, reason }) => {
//!             eprintln!("Transformer produced a broken class at {:#x}: {}", offset, reason);
//!             Err(Error::ClassFormat { offset, reason })
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! # fn main() {}
//! ```

use std::io;

/// Helper struct for formatting CrcMismatch error messages.
struct CrcMismatchDisplay<'a> {
    entry_name: &'a str,
    expected: u32,
    actual: u32,
}

impl std::fmt::Display for CrcMismatchDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CRC mismatch for entry '{}': expected {:#010x}, got {:#010x}",
            self.entry_name, self.expected, self.actual
        )
    }
}

/// The main error type for prebake operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | File system operations |
/// | Archive | [`InvalidFormat`][Self::InvalidFormat], [`CorruptHeader`][Self::CorruptHeader], [`CorruptData`][Self::CorruptData], [`CrcMismatch`][Self::CrcMismatch] | Broken input JAR |
/// | Compatibility | [`UnsupportedMethod`][Self::UnsupportedMethod], [`UnsupportedFeature`][Self::UnsupportedFeature] | ZIP64, exotic codecs |
/// | Bytecode | [`ClassFormat`][Self::ClassFormat] | Malformed class file |
/// | Collaborators | [`Transform`][Self::Transform], [`ModDescriptor`][Self::ModDescriptor], [`InvalidConfigId`][Self::InvalidConfigId] | Transformer or mod archive failures |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading or writing an archive.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a ZIP archive.
    ///
    /// Returned when no end-of-central-directory record can be located.
    #[error("Invalid ZIP format: {0}")]
    InvalidFormat(String),

    /// A ZIP structure is corrupt or truncated.
    #[error("Corrupt header at offset {offset:#x}: {reason}")]
    CorruptHeader {
        /// The byte offset where corruption was detected.
        offset: u64,
        /// A description of the corruption.
        reason: String,
    },

    /// An entry uses a compression method this crate cannot decode.
    ///
    /// Only Stored (0) and Deflated (8) payloads are decoded. Entries using
    /// other methods are still copied verbatim when they are not classes.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The ZIP method number.
        method: u16,
    },

    /// The archive relies on a ZIP feature that is not implemented.
    #[error("Unsupported feature: {feature}")]
    UnsupportedFeature {
        /// The name of the unsupported feature.
        feature: &'static str,
    },

    /// A compressed payload could not be decoded.
    #[error("Corrupt entry data: {0}")]
    CorruptData(String),

    /// The CRC-32 of a decoded entry does not match its header.
    #[error("{}", CrcMismatchDisplay { entry_name, expected: *expected, actual: *actual })]
    CrcMismatch {
        /// The entry path.
        entry_name: String,
        /// The CRC stored in the archive.
        expected: u32,
        /// The CRC of the decoded data.
        actual: u32,
    },

    /// A class file could not be decoded.
    ///
    /// Raised by the annotation filter when the transformer hands back bytes
    /// that are not a well-formed class file.
    #[error("Malformed class file at offset {offset:#x}: {reason}")]
    ClassFormat {
        /// Byte offset inside the class file.
        offset: usize,
        /// What was expected at that offset.
        reason: String,
    },

    /// An archive path is invalid.
    #[error("Invalid archive path: {0}")]
    InvalidArchivePath(String),

    /// The transformer failed for a class.
    #[error("Transformer failed for class {class_name}: {reason}")]
    Transform {
        /// The dotted class name being transformed.
        class_name: String,
        /// Failure description reported by the transformer.
        reason: String,
    },

    /// A mod archive carries an unreadable descriptor.
    #[error("Invalid mod descriptor in '{path}': {reason}")]
    ModDescriptor {
        /// Path of the mod archive.
        path: String,
        /// Parser failure description.
        reason: String,
    },

    /// A mixin configuration identifier cannot be stored one per line.
    #[error("Invalid mixin configuration identifier {id:?}: {reason}")]
    InvalidConfigId {
        /// The rejected identifier.
        id: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

impl Error {
    /// Returns `true` if the error comes from the input or mod archives
    /// themselves rather than from the environment.
    ///
    /// ```rust
    /// use prebake::Error;
    ///
    /// let err = Error::InvalidFormat("no end of central directory".into());
    /// assert!(err.is_archive_error());
    /// ```
    pub fn is_archive_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidFormat(_)
                | Error::CorruptHeader { .. }
                | Error::CorruptData(_)
                | Error::CrcMismatch { .. }
                | Error::UnsupportedMethod { .. }
                | Error::UnsupportedFeature { .. }
        )
    }

    pub(crate) fn class_format(offset: usize, reason: impl Into<String>) -> Self {
        Error::ClassFormat {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt(offset: u64, reason: impl Into<String>) -> Self {
        Error::CorruptHeader {
            offset,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for prebake operations.
pub type Result<T> = std::result::Result<T, Error>;
