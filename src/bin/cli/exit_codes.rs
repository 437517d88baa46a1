//! Exit codes for the CLI tool.

use prebake::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// The transformer failed on a class
pub const TRANSFORM_ERROR: i32 = 2;
/// Archive or class format error
pub const BAD_ARCHIVE: i32 = 3;
/// Mod descriptor could not be read
pub const BAD_MOD: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Ctrl+C (128 + SIGINT)
pub const USER_INTERRUPT: i32 = 130;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    TransformError,
    BadArchive,
    BadMod,
    IoError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::TransformError => TRANSFORM_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::BadMod => BAD_MOD,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a bake error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::InvalidFormat(_) | Error::CorruptHeader { .. } => ExitCode::BadArchive,
        Error::CorruptData(_) => ExitCode::BadArchive,
        Error::CrcMismatch { .. } => ExitCode::BadArchive,
        Error::UnsupportedMethod { .. } => ExitCode::BadArchive,
        Error::UnsupportedFeature { .. } => ExitCode::BadArchive,
        Error::ClassFormat { .. } => ExitCode::BadArchive,
        Error::InvalidArchivePath(_) => ExitCode::BadArgs,
        Error::Transform { .. } => ExitCode::TransformError,
        Error::ModDescriptor { .. } | Error::InvalidConfigId { .. } => ExitCode::BadMod,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::TransformError,
    }
}
