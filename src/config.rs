//! Applied mixin configuration registry.
//!
//! A baked jar records which mixin configurations were applied to it in the
//! reserved entry [`APPLIED_MIXIN_CONFIGS_FILENAME`], one identifier per
//! line. The registry is used twice in a jar's life:
//!
//! - At bake time it is built from the bootstrap list plus the identifiers
//!   the mods declare, and every new identifier is forwarded to the
//!   transformer through a [`ConfigRegistrar`].
//! - When a baked jar is consumed later it is loaded back with
//!   [`AppliedConfigs::load_previously_applied`], so that configurations
//!   already baked in are not registered a second time.
//!
//! # Example
//!
//! ```rust
//! use prebake::config::AppliedConfigs;
//!
//! let mut forwarded = Vec::new();
//! let mut configs = AppliedConfigs::new();
//! configs.register("modid.mixins.json", &mut forwarded)?;
//! configs.register("modid.mixins.json", &mut forwarded)?;
//! assert_eq!(forwarded, ["modid.mixins.json"]);
//!
//! let restored = AppliedConfigs::load_previously_applied(&configs.serialize());
//! assert!(restored.contains("modid.mixins.json"));
//! # Ok::<(), prebake::Error>(())
//! ```

use std::io::Read;
use std::path::Path;

use indexmap::IndexSet;

use crate::{Error, Result};
use crate::mods::MixinConfigSource;
use crate::read::Archive;

/// Name of the reserved entry holding the applied configuration list.
pub const APPLIED_MIXIN_CONFIGS_FILENAME: &str = ".fabric-applied-mixin-configs";

/// Configurations every bake starts with, ahead of any mod's own.
pub const BOOTSTRAP_CONFIGS: [&str; 3] = [
    "fabricmc.mixins.common.json",
    "fabricmc.mixins.client.json",
    "fabricmc.mixins.server.json",
];

/// Checks that `id` survives a trip through the reserved entry.
///
/// The entry stores one identifier per line and loading skips blank lines
/// and drops carriage returns, so empty identifiers and identifiers holding
/// `\n` or `\r` are rejected with [`Error::InvalidConfigId`].
pub fn validate_config_id(id: &str) -> Result<()> {
    let reason = if id.is_empty() {
        "empty identifier"
    } else if id.contains('\n') {
        "contains a line break"
    } else if id.contains('\r') {
        "contains a carriage return"
    } else {
        return Ok(());
    };
    Err(Error::InvalidConfigId {
        id: id.to_string(),
        reason,
    })
}

/// Receives configuration identifiers the registry has not seen before.
///
/// Implemented by transformers that need to know which configurations are
/// active.
pub trait ConfigRegistrar {
    /// Registers one configuration with the transformer.
    fn add_configuration(&mut self, id: &str) -> Result<()>;
}

impl<R: ConfigRegistrar + ?Sized> ConfigRegistrar for &mut R {
    fn add_configuration(&mut self, id: &str) -> Result<()> {
        (**self).add_configuration(id)
    }
}

/// Collects forwarded identifiers in order.
impl ConfigRegistrar for Vec<String> {
    fn add_configuration(&mut self, id: &str) -> Result<()> {
        self.push(id.to_string());
        Ok(())
    }
}

/// Ordered, duplicate-free set of applied configuration identifiers.
///
/// A registry is either *initialized*, holding the authoritative list and
/// deduplicating registrations against it, or *uninitialized*, in which
/// case it records nothing and forwards every registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedConfigs {
    ids: Option<IndexSet<String>>,
}

impl Default for AppliedConfigs {
    fn default() -> Self {
        Self::new()
    }
}

impl AppliedConfigs {
    /// Creates an initialized, empty registry.
    pub fn new() -> Self {
        Self {
            ids: Some(IndexSet::new()),
        }
    }

    /// Creates a registry that forwards every registration.
    pub fn uninitialized() -> Self {
        Self { ids: None }
    }

    /// Returns true once the registry holds an authoritative list.
    pub fn is_initialized(&self) -> bool {
        self.ids.is_some()
    }

    /// Registers a configuration.
    ///
    /// Known identifiers are ignored. New ones are recorded and forwarded
    /// to `registrar`; an uninitialized registry forwards without recording.
    /// Registrar errors are returned unchanged and leave the identifier
    /// unrecorded.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfigId`] if `id` cannot be stored on a line of its
    /// own; nothing is forwarded in that case.
    pub fn register<R>(&mut self, id: &str, mut registrar: R) -> Result<()>
    where
        R: ConfigRegistrar,
    {
        validate_config_id(id)?;
        match &mut self.ids {
            Some(ids) if ids.contains(id) => Ok(()),
            Some(ids) => {
                registrar.add_configuration(id)?;
                ids.insert(id.to_string());
                Ok(())
            }
            None => registrar.add_configuration(id),
        }
    }

    /// Replaces the contents with `ids`, keeping the first occurrence of
    /// each, and starts deduplicating.
    ///
    /// Identifiers rejected by [`validate_config_id`] are skipped with a
    /// warning.
    pub fn initialize_from_bootstrap<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = ids
            .into_iter()
            .map(Into::into)
            .filter(|id| match validate_config_id(id) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("skipping bootstrap configuration: {}", e);
                    false
                }
            })
            .collect();
        self.ids = Some(ids);
    }

    /// Newline-joined identifiers, the payload of the reserved entry.
    ///
    /// There is no trailing newline. An uninitialized registry serializes
    /// to nothing.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, id) in self.iter().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            out.extend_from_slice(id.as_bytes());
        }
        out
    }

    /// Rebuilds a registry from a reserved entry payload.
    ///
    /// Invalid UTF-8 is replaced, a trailing `\r` on a line is dropped and
    /// blank lines are skipped.
    pub fn load_previously_applied(data: &[u8]) -> Self {
        let text = String::from_utf8_lossy(data);
        let ids = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { ids: Some(ids) }
    }

    /// Loads the registry from an optional resource stream.
    ///
    /// A missing resource means no bake happened and yields an
    /// uninitialized registry. A read failure is logged and treated the
    /// same way.
    pub fn load_resource<R: Read>(resource: Option<R>) -> Self {
        let Some(mut resource) = resource else {
            return Self::uninitialized();
        };
        let mut data = Vec::new();
        match resource.read_to_end(&mut data) {
            Ok(_) => Self::load_previously_applied(&data),
            Err(e) => {
                log::warn!(
                    "failed to read {}, applied mixin configurations will be registered again: {}",
                    APPLIED_MIXIN_CONFIGS_FILENAME,
                    e
                );
                Self::uninitialized()
            }
        }
    }

    /// Loads the registry recorded in a baked archive.
    ///
    /// Archives without the reserved entry yield an uninitialized registry.
    pub fn load_from_archive(path: impl AsRef<Path>) -> Result<Self> {
        let mut archive = Archive::open_path(path)?;
        match archive.by_name(APPLIED_MIXIN_CONFIGS_FILENAME)? {
            Some(entry) => Ok(Self::load_previously_applied(&entry.data()?)),
            None => Ok(Self::uninitialized()),
        }
    }

    /// Returns true if `id` is recorded.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.as_ref().is_some_and(|ids| ids.contains(id))
    }

    /// Number of recorded identifiers.
    pub fn len(&self) -> usize {
        self.ids.as_ref().map_or(0, IndexSet::len)
    }

    /// Returns true if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recorded identifiers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.ids.iter().flatten().map(String::as_str)
    }
}

/// Builds the registry for a bake.
///
/// Registers [`BOOTSTRAP_CONFIGS`] followed by the common, client and server
/// configurations of `source`, in that order, forwarding each distinct
/// identifier to `registrar` exactly once.
pub fn collect_applied_configs<S, R>(source: &S, mut registrar: R) -> Result<AppliedConfigs>
where
    S: MixinConfigSource + ?Sized,
    R: ConfigRegistrar,
{
    let mut configs = AppliedConfigs::new();
    let declared = source
        .common()
        .iter()
        .chain(source.client())
        .chain(source.server())
        .map(String::as_str);
    for id in BOOTSTRAP_CONFIGS.into_iter().chain(declared) {
        configs.register(id, &mut registrar)?;
    }
    log::debug!("{} mixin configurations registered", configs.len());
    Ok(configs)
}
