//! # prebake
//!
//! Bakes mixins into a jar ahead of time.
//!
//! A bake streams an input jar through a class [`Transformer`], strips the
//! transformer's internal bookkeeping annotations from every class it
//! changed, copies all other entries untouched and records the mixin
//! configurations that were applied in the reserved
//! [`.fabric-applied-mixin-configs`](config::APPLIED_MIXIN_CONFIGS_FILENAME)
//! entry. Loading that entry back later tells the runtime which
//! configurations are already baked in.
//!
//! ## Quick Start
//!
//! ### Baking a Jar
//!
//! ```rust,no_run
//! use prebake::{BakeOptions, CommandTransformer, Result, prebake};
//!
//! fn main() -> Result<()> {
//!     let mut transformer = CommandTransformer::new("mixin-transform");
//!     let result = prebake(
//!         "minecraft.jar",
//!         "minecraft-baked.jar",
//!         &["examplemod.jar"],
//!         &mut transformer,
//!         BakeOptions::default(),
//!     )?;
//!     for class in &result.classes_transformed {
//!         println!("Transformed {}", class);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Wiring the Pieces Yourself
//!
//! ```rust,no_run
//! use prebake::config::collect_applied_configs;
//! use prebake::mods::ModDescriptors;
//! use prebake::{BakeOptions, PassThrough, Result, bake_path};
//!
//! fn main() -> Result<()> {
//!     let mods = ModDescriptors::load(["examplemod.jar"])?;
//!     let mut transformer = PassThrough;
//!     let configs = collect_applied_configs(&mods, &mut transformer)?;
//!     bake_path("in.jar", "out.jar", &mut transformer, &configs, BakeOptions::new().level(9))?;
//!     Ok(())
//! }
//! ```
//!
//! ### Reading the Applied Configurations Back
//!
//! ```rust,no_run
//! use prebake::config::AppliedConfigs;
//!
//! let applied = AppliedConfigs::load_from_archive("minecraft-baked.jar")?;
//! for id in applied.iter() {
//!     println!("{}", id);
//! }
//! # Ok::<(), prebake::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`. A bake has no partial-success mode; the
//! first error ends it.
//!
//! ## Archive Support
//!
//! Jars are read and written with the crate's own ZIP implementation
//! ([`read`], [`write`]). Stored and Deflate entries are supported; ZIP64
//! and multi-disk archives are not. Entries that are only copied are never
//! decompressed, so encrypted or oddly compressed resources survive a bake.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod archive_path;
pub mod bake;
pub mod checksum;
pub mod classfile;
pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod mods;
pub mod progress;
pub mod read;
pub mod timestamp;
pub mod transform;
pub mod write;

pub use archive_path::{ArchivePath, ClassName};
pub use error::{Error, Result};
pub use timestamp::DosDateTime;

pub use bake::{BakeOptions, BakeResult, bake, bake_path, prebake};
pub use config::{AppliedConfigs, ConfigRegistrar};
pub use mods::{MixinConfigSource, ModDescriptors};
pub use transform::{CommandTransformer, PassThrough, Transformation, Transformer};

pub use read::{Archive, ArchiveEntry};
pub use write::{EntryMeta, Writer};

pub use progress::{BakeProgress, NoProgress, StatisticsProgress};
