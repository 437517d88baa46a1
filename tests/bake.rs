//! End-to-end bake tests.
//!
//! These tests drive whole bakes over in-memory and on-disk archives and
//! check the produced jar entry by entry.

mod common;

use std::io::Cursor;

use common::{
    META_MERGED, META_PROCESSED, ScriptedTransformer, annotation_descriptors, build_class,
    create_archive, create_archive_with_meta, expect_err, read_entries, write_archive_file,
    write_mod_jar,
};
use prebake::codec::CompressionMethod;
use prebake::config::{APPLIED_MIXIN_CONFIGS_FILENAME, AppliedConfigs, BOOTSTRAP_CONFIGS};
use prebake::{
    Archive, BakeOptions, DosDateTime, EntryMeta, Error, PassThrough, StatisticsProgress, bake,
    bake_path, prebake,
};
use tempfile::TempDir;

const KEEP: &str = "Lcom/example/Keep;";

fn bake_in_memory(
    input: Vec<u8>,
    transformer: &mut ScriptedTransformer,
    configs: &AppliedConfigs,
) -> (prebake::BakeResult, Vec<u8>) {
    let mut out = Vec::new();
    let result = bake(
        Cursor::new(input),
        &mut out,
        transformer,
        configs,
        BakeOptions::default(),
    )
    .expect("Bake failed");
    (result, out)
}

fn bootstrap_configs() -> AppliedConfigs {
    let mut configs = AppliedConfigs::new();
    configs.initialize_from_bootstrap(BOOTSTRAP_CONFIGS);
    configs
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn test_changed_and_unchanged_classes() {
    let a = build_class("A", &[KEEP]);
    let b_in = build_class("B", &[]);
    let b_out = build_class("B", &[META_PROCESSED, KEEP, META_MERGED]);
    let res: &[u8] = b"\x00arbitrary\xffresource bytes";
    let input = create_archive(&[("A.class", &a[..]), ("B.class", &b_in[..]), ("res.txt", res)]).unwrap();

    let mut transformer = ScriptedTransformer::new().change("B", b_out);
    let (result, out) = bake_in_memory(input, &mut transformer, &bootstrap_configs());

    assert_eq!(result.classes_seen, 2);
    assert_eq!(result.classes_transformed, ["B"]);
    assert_eq!(result.entries_copied, 1);

    let entries = read_entries(&out);
    let paths: Vec<_> = entries.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(paths, ["A.class", "B.class", "res.txt", APPLIED_MIXIN_CONFIGS_FILENAME]);

    assert_eq!(entries[0].1, a);
    assert_eq!(annotation_descriptors(&entries[1].1), [KEEP, KEEP, KEEP]);
    assert_eq!(entries[2].1, res);
    assert_eq!(
        String::from_utf8(entries[3].1.clone()).unwrap(),
        BOOTSTRAP_CONFIGS.join("\n")
    );
}

#[test]
fn test_transformer_sees_same_name_twice() {
    let input = create_archive(&[
        ("net/fabricmc/Foo.class", &build_class("net/fabricmc/Foo", &[])[..]),
        ("net/fabricmc/Foo$Inner.class", &build_class("net/fabricmc/Foo$Inner", &[])[..]),
        ("assets/readme.txt", b"not a class"),
    ])
    .unwrap();

    let mut transformer = ScriptedTransformer::new();
    bake_in_memory(input, &mut transformer, &AppliedConfigs::new());

    assert_eq!(
        transformer.calls,
        [
            ("net.fabricmc.Foo".to_string(), "net.fabricmc.Foo".to_string()),
            (
                "net.fabricmc.Foo$Inner".to_string(),
                "net.fabricmc.Foo$Inner".to_string()
            ),
        ]
    );
}

#[test]
fn test_unchanged_class_is_not_filtered() {
    // An untouched class keeps even annotations under the internal prefix.
    let class = build_class("Plain", &[META_PROCESSED]);
    let input = create_archive(&[("Plain.class", &class[..])]).unwrap();

    let (result, out) =
        bake_in_memory(input, &mut ScriptedTransformer::new(), &AppliedConfigs::new());
    assert!(result.classes_transformed.is_empty());
    assert_eq!(read_entries(&out)[0].1, class);
}

#[test]
fn test_changed_class_without_metadata_is_written_as_returned() {
    let original = build_class("C", &[]);
    let rewritten = build_class("C", &[KEEP]);
    let input = create_archive(&[("C.class", &original[..])]).unwrap();

    let mut transformer = ScriptedTransformer::new().change("C", rewritten.clone());
    let (_, out) = bake_in_memory(input, &mut transformer, &AppliedConfigs::new());
    assert_eq!(read_entries(&out)[0].1, rewritten);
}

#[test]
fn test_stale_reserved_entry_is_replaced() {
    let input = create_archive(&[
        (APPLIED_MIXIN_CONFIGS_FILENAME, b"old.mixins.json"),
        ("a.txt", b"a"),
        (APPLIED_MIXIN_CONFIGS_FILENAME, b"older.mixins.json"),
    ])
    .unwrap();

    let (result, out) =
        bake_in_memory(input, &mut ScriptedTransformer::new(), &bootstrap_configs());
    assert_eq!(result.reserved_entries_dropped, 2);

    let entries = read_entries(&out);
    let reserved: Vec<_> = entries
        .iter()
        .filter(|(p, _)| p == APPLIED_MIXIN_CONFIGS_FILENAME)
        .collect();
    assert_eq!(reserved.len(), 1);
    assert_eq!(entries.last().unwrap().0, APPLIED_MIXIN_CONFIGS_FILENAME);
    assert!(!String::from_utf8_lossy(&reserved[0].1).contains("old"));
}

#[test]
fn test_empty_input_still_gets_reserved_entry() {
    let input = create_archive(&[]).unwrap();
    let (_, out) = bake_in_memory(input, &mut ScriptedTransformer::new(), &AppliedConfigs::new());
    let entries = read_entries(&out);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, APPLIED_MIXIN_CONFIGS_FILENAME);
    assert!(entries[0].1.is_empty());
}

// =============================================================================
// Verbatim copies
// =============================================================================

#[test]
fn test_non_class_entries_copied_verbatim() {
    let fixed = DosDateTime::from_raw(0x4A21, 0x6000);
    let input = create_archive_with_meta(&[
        (
            "META-INF/MANIFEST.MF",
            b"Manifest-Version: 1.0\r\n",
            EntryMeta::default().modified(fixed),
        ),
        (
            "data/blob.bin",
            &[7u8; 300][..],
            EntryMeta::default()
                .method(CompressionMethod::Stored)
                .modified(fixed)
                .comment("kept as is"),
        ),
    ])
    .unwrap();

    let mut before = Archive::open(Cursor::new(input.clone())).unwrap();
    let expected: Vec<_> = before.entries().map(|e| e.unwrap()).collect();

    let mut transformer = ScriptedTransformer::new();
    let (_, out) = bake_in_memory(input, &mut transformer, &AppliedConfigs::new());
    assert!(transformer.calls.is_empty());

    let mut after = Archive::open(Cursor::new(out)).unwrap();
    for original in &expected {
        let copied = after.next_entry().unwrap().unwrap();
        assert_eq!(copied.path, original.path);
        assert_eq!(copied.comment, original.comment);
        assert_eq!(copied.modified, original.modified);
        assert_eq!(copied.method, original.method);
        assert_eq!(copied.crc32, original.crc32);
        assert_eq!(copied.payload(), original.payload());
    }
    assert_eq!(
        expected[1].comment.as_deref(),
        Some("kept as is"),
        "comment survives the copy"
    );
}

#[test]
fn test_class_entries_keep_comment_and_get_fresh_timestamp() {
    let old = DosDateTime::from_raw(0x2021, 0); // 1996-01-01
    let input = create_archive_with_meta(&[(
        "X.class",
        &build_class("X", &[])[..],
        EntryMeta::default().modified(old).comment("class comment"),
    )])
    .unwrap();

    let mut out = Vec::new();
    let pinned = DosDateTime::from_raw(0x5A21, 0x6000);
    bake(
        Cursor::new(input),
        &mut out,
        &mut PassThrough,
        &AppliedConfigs::new(),
        BakeOptions::new().modified(pinned.as_system_time()),
    )
    .unwrap();

    let mut archive = Archive::open(Cursor::new(out)).unwrap();
    let class = archive.next_entry().unwrap().unwrap();
    assert_eq!(class.comment.as_deref(), Some("class comment"));
    assert_eq!(class.modified, pinned);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_transformer_error_propagates_unchanged() {
    let input = create_archive(&[
        ("A.class", &build_class("A", &[])[..]),
        ("B.class", &build_class("B", &[])[..]),
    ])
    .unwrap();

    let mut transformer = ScriptedTransformer::new().fail_on("A");
    let err = expect_err(bake(
        Cursor::new(input),
        Vec::new(),
        &mut transformer,
        &AppliedConfigs::new(),
        BakeOptions::default(),
    ));
    match err {
        Error::Transform { class_name, reason } => {
            assert_eq!(class_name, "A");
            assert_eq!(reason, "scripted failure");
        }
        other => panic!("unexpected error: {}", other),
    }
    // The bake stops at the first failure.
    assert_eq!(transformer.calls.len(), 1);
}

#[test]
fn test_broken_transformer_output_is_fatal() {
    let input = create_archive(&[("A.class", &build_class("A", &[])[..])]).unwrap();
    let mut transformer = ScriptedTransformer::new().change("A", b"\xca\xfe\xba\xbe\x00".to_vec());
    let err = expect_err(bake(
        Cursor::new(input),
        Vec::new(),
        &mut transformer,
        &AppliedConfigs::new(),
        BakeOptions::default(),
    ));
    assert!(matches!(err, Error::ClassFormat { .. }));
}

#[test]
fn test_input_that_is_not_a_zip() {
    let err = expect_err(bake(
        Cursor::new(b"definitely not a jar".to_vec()),
        Vec::new(),
        &mut PassThrough,
        &AppliedConfigs::new(),
        BakeOptions::default(),
    ));
    assert!(err.is_archive_error());
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let err = expect_err(bake_path(
        dir.path().join("missing.jar"),
        dir.path().join("out.jar"),
        &mut PassThrough,
        &AppliedConfigs::new(),
        BakeOptions::default(),
    ));
    assert!(matches!(err, Error::Io(_)));
    assert!(!dir.path().join("out.jar").exists());
}

// =============================================================================
// Files and mods
// =============================================================================

#[test]
fn test_prebake_with_mods() {
    let dir = TempDir::new().unwrap();
    let input = write_archive_file(
        dir.path(),
        "minecraft.jar",
        &[
            ("net/minecraft/Game.class", &build_class("net/minecraft/Game", &[])[..]),
            ("pack.png", b"\x89PNG"),
        ],
    );
    let mod_a = write_mod_jar(
        dir.path(),
        "a.jar",
        r#"{"id":"a","mixins":{"common":"a.common.json","client":["a.client.json"]}}"#,
    );
    let mod_b = write_mod_jar(
        dir.path(),
        "b.jar",
        r#"{"id":"b","mixins":{"server":"b.server.json","common":"a.common.json"}}"#,
    );
    let plain = write_archive_file(dir.path(), "library.jar", &[("lib/Util.class", b"")]);
    let output = dir.path().join("baked.jar");

    let game = build_class("net/minecraft/Game", &[META_MERGED, KEEP]);
    let mut transformer = ScriptedTransformer::new().change("net.minecraft.Game", game);
    let result = prebake(
        &input,
        &output,
        &[mod_a.clone(), mod_b, plain, mod_a],
        &mut transformer,
        BakeOptions::new().progress(StatisticsProgress::new()),
    )
    .unwrap();

    let expected = [
        "fabricmc.mixins.common.json",
        "fabricmc.mixins.client.json",
        "fabricmc.mixins.server.json",
        "a.common.json",
        "a.client.json",
        "b.server.json",
    ];
    assert_eq!(transformer.configs, expected);
    assert_eq!(result.configs_written, expected.len());
    assert_eq!(result.classes_transformed, ["net.minecraft.Game"]);

    let applied = AppliedConfigs::load_from_archive(&output).unwrap();
    assert_eq!(applied.iter().collect::<Vec<_>>(), expected);

    let bytes = std::fs::read(&output).unwrap();
    let entries = read_entries(&bytes);
    assert_eq!(annotation_descriptors(&entries[0].1), [KEEP, KEEP, KEEP]);
    assert_eq!(entries[1], ("pack.png".to_string(), b"\x89PNG".to_vec()));
}

#[test]
fn test_rebaking_a_baked_jar() {
    let dir = TempDir::new().unwrap();
    let input = write_archive_file(dir.path(), "in.jar", &[("A.class", &build_class("A", &[])[..])]);
    let once = dir.path().join("once.jar");
    let twice = dir.path().join("twice.jar");

    let configs = bootstrap_configs();
    bake_path(&input, &once, &mut PassThrough, &configs, BakeOptions::default()).unwrap();
    let result = bake_path(&once, &twice, &mut PassThrough, &configs, BakeOptions::default())
        .unwrap();
    assert_eq!(result.reserved_entries_dropped, 1);

    let entries = read_entries(&std::fs::read(&twice).unwrap());
    assert_eq!(entries.len(), 2);
    assert_eq!(
        AppliedConfigs::load_from_archive(&twice).unwrap(),
        AppliedConfigs::load_from_archive(&once).unwrap()
    );
}
