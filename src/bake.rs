//! The bake pipeline.
//!
//! A bake makes one pass over the input archive:
//!
//! - the reserved [`APPLIED_MIXIN_CONFIGS_FILENAME`] entry is dropped;
//! - every class goes through the [`Transformer`]; changed classes have the
//!   transformer's internal metadata annotations stripped and are written
//!   with a fresh timestamp, unchanged classes are written back as they
//!   were read;
//! - every other entry is copied without recompression;
//!
//! and finally writes the registry of applied configurations as the
//! reserved entry, which is therefore always the last one.
//!
//! Entries are processed strictly in archive order, one at a time.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek};
use std::path::Path;
use std::time::SystemTime;

use crate::archive_path::ArchivePath;
use crate::classfile::strip_internal_metadata;
use crate::config::{APPLIED_MIXIN_CONFIGS_FILENAME, AppliedConfigs, ConfigRegistrar, collect_applied_configs};
use crate::mods::ModDescriptors;
use crate::progress::{BakeProgress, NoProgress};
use crate::read::Archive;
use crate::timestamp::DosDateTime;
use crate::transform::{Transformation, Transformer};
use crate::write::{EntryMeta, Writer};
use crate::Result;

/// Default Deflate level for rewritten entries.
pub const DEFAULT_LEVEL: u32 = 6;

/// Options for a bake.
///
/// # Example
///
/// ```rust
/// use prebake::BakeOptions;
/// use std::time::{Duration, UNIX_EPOCH};
///
/// let options = BakeOptions::new()
///     .level(9)
///     .modified(UNIX_EPOCH + Duration::from_secs(1_500_000_000));
/// assert_eq!(options.level, 9);
/// ```
pub struct BakeOptions {
    /// Deflate level (0-9) for classes and the configurations entry.
    pub level: u32,
    /// Timestamp for written entries; `None` uses the time of writing.
    pub modified: Option<SystemTime>,
    /// Progress reporter (optional).
    pub progress: Option<Box<dyn BakeProgress>>,
}

impl Default for BakeOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            modified: None,
            progress: None,
        }
    }
}

impl std::fmt::Debug for BakeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BakeOptions")
            .field("level", &self.level)
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}

impl BakeOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Deflate level (clamped to 9).
    pub fn level(mut self, level: u32) -> Self {
        self.level = level.min(9);
        self
    }

    /// Pins the timestamp of written entries, for reproducible output.
    pub fn modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Sets the progress reporter.
    pub fn progress(mut self, reporter: impl BakeProgress + 'static) -> Self {
        self.progress = Some(Box::new(reporter));
        self
    }

    fn entry_meta(&self) -> EntryMeta {
        let modified = self
            .modified
            .map(DosDateTime::from_system_time)
            .unwrap_or_else(DosDateTime::now);
        EntryMeta::default().level(self.level).modified(modified)
    }
}

/// Summary of a completed bake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct BakeResult {
    /// Non-class entries copied verbatim.
    pub entries_copied: usize,
    /// Class entries handed to the transformer.
    pub classes_seen: usize,
    /// Classes the transformer changed, in archive order.
    pub classes_transformed: Vec<String>,
    /// Stale configurations entries found in the input and dropped.
    pub reserved_entries_dropped: usize,
    /// Identifiers written to the configurations entry.
    pub configs_written: usize,
}

/// Bakes `input` into `output`.
///
/// Pass `&mut` to a sink to keep it: `bake(input, &mut buffer, ...)`.
///
/// # Errors
///
/// Any failure aborts the bake and leaves `output` incomplete:
///
/// - archive errors reading `input` or writing `output`
/// - [`Error::ClassFormat`](crate::Error::ClassFormat) if a changed class cannot be filtered
/// - errors returned by the transformer, unchanged
pub fn bake<R, W, T>(
    input: R,
    output: W,
    transformer: &mut T,
    configs: &AppliedConfigs,
    mut options: BakeOptions,
) -> Result<BakeResult>
where
    R: Read + Seek,
    W: std::io::Write,
    T: Transformer + ?Sized,
{
    let mut archive = Archive::open(input)?;
    let mut writer = Writer::new(output);
    let mut progress: Box<dyn BakeProgress> =
        options.progress.take().unwrap_or_else(|| Box::new(NoProgress));
    let mut result = BakeResult::default();

    progress.on_start(archive.len());
    while let Some(entry) = archive.next_entry()? {
        progress.on_entry_start(&entry.path, entry.size);

        if entry.path == APPLIED_MIXIN_CONFIGS_FILENAME {
            log::debug!("dropping stale {}", APPLIED_MIXIN_CONFIGS_FILENAME);
            result.reserved_entries_dropped += 1;
        } else if let Some(class_name) = entry.class_name() {
            result.classes_seen += 1;
            let original = entry.data()?;
            let name = class_name.as_str();
            let class = match transformer.transform(name, name, &original)? {
                Transformation::Unchanged => original,
                Transformation::Changed(changed) => {
                    log::info!("Transformed {}", name);
                    progress.on_class_transformed(name);
                    result.classes_transformed.push(name.to_string());
                    strip_internal_metadata(&changed)?
                }
            };
            writer.write_rewritten(&entry, &class, &options.entry_meta())?;
        } else {
            log::debug!("copying {}", entry.path);
            writer.write_raw(&entry)?;
            result.entries_copied += 1;
        }

        progress.on_entry_complete(&entry.path);
    }

    let reserved = ArchivePath::new(APPLIED_MIXIN_CONFIGS_FILENAME)?;
    writer.write_bytes(&reserved, &configs.serialize(), &options.entry_meta())?;
    result.configs_written = configs.len();
    writer.finish()?;
    progress.on_finish();

    log::debug!(
        "bake finished: {} classes seen, {} transformed, {} entries copied",
        result.classes_seen,
        result.classes_transformed.len(),
        result.entries_copied
    );
    Ok(result)
}

/// Bakes the archive at `input` into a new archive at `output`.
///
/// Both files are closed before this returns, whether it succeeds or not.
/// On failure the output file is left behind incomplete.
pub fn bake_path<T>(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    transformer: &mut T,
    configs: &AppliedConfigs,
    options: BakeOptions,
) -> Result<BakeResult>
where
    T: Transformer + ?Sized,
{
    let input = BufReader::new(File::open(input.as_ref())?);
    let output = BufWriter::new(File::create(output.as_ref())?);
    bake(input, output, transformer, configs, options)
}

/// Discovers the mods' configurations, registers them with `transformer`
/// and bakes `input` into `output`.
///
/// This is the whole `prebake` command as a library call.
pub fn prebake<P, T>(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    mods: &[P],
    transformer: &mut T,
    options: BakeOptions,
) -> Result<BakeResult>
where
    P: AsRef<Path>,
    T: Transformer + ConfigRegistrar + ?Sized,
{
    let descriptors = ModDescriptors::load(mods)?;
    let configs = collect_applied_configs(&descriptors, &mut *transformer)?;
    bake_path(input, output, transformer, &configs, options)
}
