//! Entry names: validated archive paths and the class names derived from them.

use crate::{Error, Result};
use std::fmt;

/// Maximum length for archive paths (in bytes).
///
/// The ZIP headers store name lengths as `u16`.
const MAX_PATH_LENGTH: usize = u16::MAX as usize;

/// File-name suffix that marks an entry as a compiled class.
pub const CLASS_SUFFIX: &str = ".class";

/// A validated path for entries this crate creates itself.
///
/// Entries copied or rewritten from an input archive keep their original
/// name bytes untouched; `ArchivePath` only guards names built from scratch,
/// such as the applied-configurations entry.
///
/// `ArchivePath` validates that:
/// - No NUL bytes are present
/// - The path is not absolute (does not start with `/`)
/// - No empty segments exist (no `//` or trailing `/`)
/// - No `.` or `..` segments are present
///
/// # Examples
///
/// ```
/// use prebake::ArchivePath;
///
/// let path = ArchivePath::new("net/fabricmc/Foo.class").unwrap();
/// assert_eq!(path.file_name(), "Foo.class");
///
/// assert!(ArchivePath::new("../secret").is_err());
/// assert!(ArchivePath::new("/absolute/path").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchivePath(String);

impl ArchivePath {
    /// Creates a new `ArchivePath` from a string, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArchivePath`] if the path is empty, too long,
    /// absolute, contains NUL bytes, empty segments, or `.`/`..` segments.
    pub fn new(s: &str) -> Result<Self> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    fn validate(s: &str) -> Result<()> {
        if s.contains('\0') {
            return Err(Error::InvalidArchivePath("contains NUL byte".into()));
        }

        if s.is_empty() {
            return Err(Error::InvalidArchivePath("empty path".into()));
        }

        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidArchivePath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }

        if s.starts_with('/') {
            return Err(Error::InvalidArchivePath(
                "absolute path not allowed".into(),
            ));
        }

        for segment in s.split('/') {
            if segment.is_empty() {
                return Err(Error::InvalidArchivePath(
                    "empty segment (consecutive or trailing slashes)".into(),
                ));
            }
            if segment == "." {
                return Err(Error::InvalidArchivePath("'.' segment not allowed".into()));
            }
            if segment == ".." {
                return Err(Error::InvalidArchivePath(
                    "'..' segment not allowed (path traversal)".into(),
                ));
            }
        }

        Ok(())
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns true if the path names a class file.
    pub fn is_class(&self) -> bool {
        self.0.ends_with(CLASS_SUFFIX)
    }
}

impl AsRef<str> for ArchivePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for ArchivePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArchivePath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

/// A dotted binary class name such as `net.fabricmc.base.Fabric$1`.
///
/// Derived from a class entry path by dropping the `.class` suffix and
/// turning `/` into `.`. The mapping is reversible for every path whose
/// directory segments contain no dots, which holds for all class files a
/// Java compiler lays out.
///
/// ```
/// use prebake::ClassName;
///
/// let name = ClassName::from_entry_path("net/fabricmc/Foo$Bar.class").unwrap();
/// assert_eq!(name.as_str(), "net.fabricmc.Foo$Bar");
/// assert_eq!(name.to_entry_path(), "net/fabricmc/Foo$Bar.class");
/// assert!(ClassName::from_entry_path("assets/logo.png").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassName(String);

impl ClassName {
    /// Derives the class name for a class entry, or `None` for other entries.
    pub fn from_entry_path(path: &str) -> Option<Self> {
        let stem = path.strip_suffix(CLASS_SUFFIX)?;
        Some(Self(stem.replace('/', ".")))
    }

    /// Returns the dotted name.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the JVM internal form (`net/fabricmc/Foo`).
    pub fn internal_name(&self) -> String {
        self.0.replace('.', "/")
    }

    /// Returns the archive path the class is stored under.
    pub fn to_entry_path(&self) -> String {
        format!("{}{}", self.internal_name(), CLASS_SUFFIX)
    }
}

impl AsRef<str> for ClassName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
