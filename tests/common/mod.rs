//! Shared test utilities for integration tests.
//!
//! Archive, class-file and mod-jar builders plus a scripted transformer.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use prebake::classfile::strip_annotations;
use prebake::{
    Archive, ArchivePath, ConfigRegistrar, EntryMeta, Error, Transformation, Transformer, Writer,
};

pub const META_PROCESSED: &str = "Lorg/spongepowered/asm/mixin/transformer/meta/MixinProcessed;";
pub const META_MERGED: &str = "Lorg/spongepowered/asm/mixin/transformer/meta/MixinMerged;";

/// Creates an in-memory archive with default entry options.
///
/// # Example
///
/// ```ignore
/// let entries = [("file.txt", b"content" as &[u8])];
/// let archive_bytes = create_archive(&entries).unwrap();
/// ```
pub fn create_archive(entries: &[(&str, &[u8])]) -> prebake::Result<Vec<u8>> {
    let with_meta: Vec<_> = entries
        .iter()
        .map(|(name, data)| (*name, *data, EntryMeta::default()))
        .collect();
    create_archive_with_meta(&with_meta)
}

/// Creates an in-memory archive with per-entry options.
pub fn create_archive_with_meta(entries: &[(&str, &[u8], EntryMeta)]) -> prebake::Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    for (name, data, meta) in entries {
        writer.write_bytes(&ArchivePath::new(name)?, data, meta)?;
    }
    writer.finish()
}

/// Writes an archive to `dir/name` and returns its path.
pub fn write_archive_file(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let bytes = create_archive(entries).expect("Failed to create test archive");
    std::fs::write(&path, bytes).expect("Failed to write archive");
    path
}

/// Writes a mod jar carrying the given `mod.json`.
pub fn write_mod_jar(dir: &Path, name: &str, mod_json: &str) -> PathBuf {
    write_archive_file(
        dir,
        name,
        &[
            ("mod.json", mod_json.as_bytes()),
            ("examplemod/Hooks.class", &build_class("examplemod/Hooks", &[])[..]),
        ],
    )
}

/// Reads every entry of an archive as (path, decoded data).
pub fn read_entries(archive_bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = Archive::open(Cursor::new(archive_bytes)).expect("Failed to open archive");
    archive
        .entries()
        .map(|entry| {
            let entry = entry.expect("Failed to read entry");
            let data = entry
                .data()
                .unwrap_or_else(|e| panic!("Failed to decode '{}': {}", entry.path, e));
            (entry.path.clone(), data)
        })
        .collect()
}

/// Extracts the error from a Result, panicking if it's Ok.
pub fn expect_err<T, E>(result: Result<T, E>) -> E {
    match result {
        Ok(_) => panic!("Expected error but got Ok"),
        Err(e) => e,
    }
}

/// Annotation descriptors present in a class, in walk order
/// (fields, then methods, then the class itself).
pub fn annotation_descriptors(class: &[u8]) -> Vec<String> {
    let mut seen = Vec::new();
    strip_annotations(class, |desc| {
        seen.push(desc.to_string());
        false
    })
    .expect("Failed to walk class");
    seen
}

/// Assembles a class with one field and one method, each carrying the same
/// annotations as the class itself.
pub fn build_class(internal_name: &str, annotations: &[&str]) -> Vec<u8> {
    let mut pool = ConstantPool::default();
    let this_name = pool.utf8(internal_name);
    let this_class = pool.class(this_name);
    let object = pool.utf8("java/lang/Object");
    let super_class = pool.class(object);

    let field = pool.member("value", "I", annotations);
    let method = pool.member("run", "()V", annotations);
    let class_attributes = pool.annotation_attributes(annotations);

    let mut out = 0xCAFE_BABEu32.to_be_bytes().to_vec();
    out.extend([0, 0, 0, 52]);
    out.extend(pool.count.to_be_bytes());
    out.extend(&pool.bytes);
    out.extend([0x00, 0x21]);
    out.extend(this_class.to_be_bytes());
    out.extend(super_class.to_be_bytes());
    out.extend([0, 0]); // interfaces
    out.extend([0, 1]);
    out.extend(field);
    out.extend([0, 1]);
    out.extend(method);
    out.extend(class_attributes);
    out
}

struct ConstantPool {
    bytes: Vec<u8>,
    count: u16,
    utf8: HashMap<String, u16>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            count: 1,
            utf8: HashMap::new(),
        }
    }
}

impl ConstantPool {
    fn utf8(&mut self, s: &str) -> u16 {
        if let Some(&index) = self.utf8.get(s) {
            return index;
        }
        let index = self.count;
        self.bytes.push(1);
        self.bytes.extend((s.len() as u16).to_be_bytes());
        self.bytes.extend(s.as_bytes());
        self.count += 1;
        self.utf8.insert(s.to_string(), index);
        index
    }

    fn class(&mut self, name_index: u16) -> u16 {
        let index = self.count;
        self.bytes.push(7);
        self.bytes.extend(name_index.to_be_bytes());
        self.count += 1;
        index
    }

    /// `attributes_count` plus a visible annotations attribute if needed.
    fn annotation_attributes(&mut self, descriptors: &[&str]) -> Vec<u8> {
        if descriptors.is_empty() {
            return vec![0, 0];
        }
        let name = self.utf8("RuntimeVisibleAnnotations");
        let mut body = (descriptors.len() as u16).to_be_bytes().to_vec();
        for desc in descriptors {
            body.extend(self.utf8(desc).to_be_bytes());
            body.extend([0, 0]);
        }
        let mut out = vec![0, 1];
        out.extend(name.to_be_bytes());
        out.extend((body.len() as u32).to_be_bytes());
        out.extend(body);
        out
    }

    fn member(&mut self, name: &str, desc: &str, annotations: &[&str]) -> Vec<u8> {
        let mut out = vec![0x00, 0x01];
        out.extend(self.utf8(name).to_be_bytes());
        out.extend(self.utf8(desc).to_be_bytes());
        out.extend(self.annotation_attributes(annotations));
        out
    }
}

/// Transformer that replaces chosen classes and records every call.
#[derive(Debug, Default)]
pub struct ScriptedTransformer {
    /// Replacement bytes by dotted class name.
    pub changes: HashMap<String, Vec<u8>>,
    /// Class names that fail to transform.
    pub failures: Vec<String>,
    /// (name, transformed_name) of every call, in order.
    pub calls: Vec<(String, String)>,
    /// Configurations forwarded by the registry, in order.
    pub configs: Vec<String>,
}

impl ScriptedTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn change(mut self, class_name: &str, bytes: Vec<u8>) -> Self {
        self.changes.insert(class_name.to_string(), bytes);
        self
    }

    pub fn fail_on(mut self, class_name: &str) -> Self {
        self.failures.push(class_name.to_string());
        self
    }
}

impl Transformer for ScriptedTransformer {
    fn transform(
        &mut self,
        name: &str,
        transformed_name: &str,
        _class: &[u8],
    ) -> prebake::Result<Transformation> {
        self.calls
            .push((name.to_string(), transformed_name.to_string()));
        if self.failures.iter().any(|f| f == name) {
            return Err(Error::Transform {
                class_name: name.to_string(),
                reason: "scripted failure".into(),
            });
        }
        Ok(match self.changes.get(name) {
            Some(bytes) => Transformation::Changed(bytes.clone()),
            None => Transformation::Unchanged,
        })
    }
}

impl ConfigRegistrar for ScriptedTransformer {
    fn add_configuration(&mut self, id: &str) -> prebake::Result<()> {
        self.configs.push(id.to_string());
        Ok(())
    }
}
