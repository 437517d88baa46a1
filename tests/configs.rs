//! Applied configuration registry tests against real archives.

mod common;

use common::{create_archive, write_archive_file};
use prebake::config::{APPLIED_MIXIN_CONFIGS_FILENAME, AppliedConfigs, collect_applied_configs};
use prebake::mods::ModDescriptors;
use prebake::{Archive, BakeOptions, Error, PassThrough, bake_path};
use std::io::Cursor;
use tempfile::TempDir;

#[test]
fn test_registry_survives_a_bake() {
    let dir = TempDir::new().unwrap();
    let input = write_archive_file(dir.path(), "in.jar", &[("x.txt", b"x")]);
    let output = dir.path().join("out.jar");

    let mut configs = AppliedConfigs::new();
    for id in ["first.mixins.json", "second.mixins.json", "first.mixins.json"] {
        configs.register(id, Vec::new()).unwrap();
    }
    bake_path(&input, &output, &mut PassThrough, &configs, BakeOptions::default()).unwrap();

    let loaded = AppliedConfigs::load_from_archive(&output).unwrap();
    assert!(loaded.is_initialized());
    assert_eq!(
        loaded.iter().collect::<Vec<_>>(),
        ["first.mixins.json", "second.mixins.json"]
    );
    assert_eq!(loaded, configs);
}

#[test]
fn test_archive_without_registry_is_uninitialized() {
    let dir = TempDir::new().unwrap();
    let plain = write_archive_file(dir.path(), "plain.jar", &[("a.txt", b"a")]);

    let loaded = AppliedConfigs::load_from_archive(&plain).unwrap();
    assert!(!loaded.is_initialized());
    assert!(loaded.is_empty());
}

#[test]
fn test_uninitialized_registry_forwards_everything() {
    let mut forwarded: Vec<String> = Vec::new();
    let mut configs = AppliedConfigs::uninitialized();
    configs.register("a.json", &mut forwarded).unwrap();
    configs.register("a.json", &mut forwarded).unwrap();
    assert_eq!(forwarded, ["a.json", "a.json"]);
    assert!(configs.serialize().is_empty());
}

#[test]
fn test_registry_entry_is_readable_as_resource() {
    let bytes = create_archive(&[(APPLIED_MIXIN_CONFIGS_FILENAME, b"a.json\r\nb.json\n")]).unwrap();
    let mut archive = Archive::open(Cursor::new(bytes)).unwrap();
    let entry = archive
        .by_name(APPLIED_MIXIN_CONFIGS_FILENAME)
        .unwrap()
        .expect("registry entry");
    let data = entry.data().unwrap();

    let loaded = AppliedConfigs::load_resource(Some(&data[..]));
    assert_eq!(loaded.iter().collect::<Vec<_>>(), ["a.json", "b.json"]);
    assert!(!AppliedConfigs::load_resource(None::<&[u8]>).is_initialized());
}

#[test]
fn test_collect_from_empty_mod_set() {
    let mut forwarded: Vec<String> = Vec::new();
    let mods = ModDescriptors::load(Vec::<std::path::PathBuf>::new()).unwrap();
    let configs = collect_applied_configs(&mods, &mut forwarded).unwrap();
    assert_eq!(configs.len(), 3);
    assert_eq!(forwarded.len(), 3);
    assert!(forwarded.iter().all(|id| id.starts_with("fabricmc.mixins.")));
}

#[test]
fn test_load_from_missing_archive() {
    let dir = TempDir::new().unwrap();
    let err = AppliedConfigs::load_from_archive(dir.path().join("nope.jar")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
