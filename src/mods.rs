//! Mixin configuration discovery in mod archives.
//!
//! Every mod jar carries a `mod.json` at its root. Its `mixins` object lists
//! the configurations the mod contributes, grouped by the side they apply
//! to:
//!
//! ```json
//! {
//!   "id": "examplemod",
//!   "mixins": {
//!     "common": "examplemod.mixins.common.json",
//!     "client": ["examplemod.mixins.client.json", "examplemod.mixins.hud.json"]
//!   }
//! }
//! ```
//!
//! Each group may be a single string or an array; missing groups are empty.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::Deserialize;

use crate::config::validate_config_id;
use crate::read::Archive;
use crate::{Error, Result};

/// Name of the mod descriptor at the root of a mod archive.
pub const MOD_DESCRIPTOR: &str = "mod.json";

/// Supplies the mixin configurations to register for a bake.
pub trait MixinConfigSource {
    /// Configurations applied on both sides.
    fn common(&self) -> &[String];

    /// Client-only configurations.
    fn client(&self) -> &[String];

    /// Server-only configurations.
    fn server(&self) -> &[String];
}

/// Mixin configurations declared by a set of mod archives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModDescriptors {
    common: Vec<String>,
    client: Vec<String>,
    server: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ModJson {
    #[serde(default)]
    mixins: Option<MixinLists>,
}

#[derive(Debug, Default, Deserialize)]
struct MixinLists {
    #[serde(default)]
    common: OneOrMany,
    #[serde(default)]
    client: OneOrMany,
    #[serde(default)]
    server: OneOrMany,
}

#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::None => Vec::new(),
            OneOrMany::One(id) => vec![id],
            OneOrMany::Many(ids) => ids,
        }
    }
}

impl ModDescriptors {
    /// Builds descriptors from explicit lists.
    pub fn from_lists(common: Vec<String>, client: Vec<String>, server: Vec<String>) -> Self {
        Self {
            common,
            client,
            server,
        }
    }

    /// Reads `mod.json` from each mod archive.
    ///
    /// Paths given more than once are read once. Archives without a
    /// descriptor contribute nothing.
    ///
    /// # Errors
    ///
    /// Fails if an archive cannot be opened or read, or with
    /// [`Error::ModDescriptor`] if its descriptor is not valid JSON of the
    /// expected shape or declares an identifier that cannot be recorded (see
    /// [`validate_config_id`]).
    pub fn load<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let unique: IndexSet<PathBuf> = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();

        let mut descriptors = Self::default();
        for path in &unique {
            descriptors.load_one(path)?;
        }
        Ok(descriptors)
    }

    fn load_one(&mut self, path: &Path) -> Result<()> {
        let mut archive = Archive::open_path(path)?;
        let Some(entry) = archive.by_name(MOD_DESCRIPTOR)? else {
            log::debug!("{}: no {}, skipping", path.display(), MOD_DESCRIPTOR);
            return Ok(());
        };

        let json = entry.data()?;
        self.add_descriptor(&json).map_err(|reason| Error::ModDescriptor {
            path: path.display().to_string(),
            reason,
        })?;
        log::debug!("{}: read {}", path.display(), MOD_DESCRIPTOR);
        Ok(())
    }

    /// Parses one `mod.json` document and appends its configurations.
    fn add_descriptor(&mut self, json: &[u8]) -> std::result::Result<(), String> {
        let parsed: ModJson = serde_json::from_slice(json).map_err(|e| e.to_string())?;
        let Some(mixins) = parsed.mixins else {
            return Ok(());
        };
        let (common, client, server) = (
            mixins.common.into_vec(),
            mixins.client.into_vec(),
            mixins.server.into_vec(),
        );
        for id in common.iter().chain(&client).chain(&server) {
            validate_config_id(id).map_err(|e| e.to_string())?;
        }
        self.common.extend(common);
        self.client.extend(client);
        self.server.extend(server);
        Ok(())
    }

    /// Returns true if no mod declared any configuration.
    pub fn is_empty(&self) -> bool {
        self.common.is_empty() && self.client.is_empty() && self.server.is_empty()
    }
}

impl MixinConfigSource for ModDescriptors {
    fn common(&self) -> &[String] {
        &self.common
    }

    fn client(&self) -> &[String] {
        &self.client
    }

    fn server(&self) -> &[String] {
        &self.server
    }
}
