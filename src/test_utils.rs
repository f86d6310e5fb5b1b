//! Test utilities for building listings and checking ncdu documents.
//!
//! This module is only compiled for tests and benchmarks.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use crate::error::SourceError;
use crate::ncdu::EMPTY_NAME;
use crate::source::ObjectEntry;
use crate::tree::split_key;

/// Turn `(key, size)` pairs into the item type sources yield.
pub fn entries(items: &[(&str, u64)]) -> Vec<Result<ObjectEntry, SourceError>> {
    items
        .iter()
        .map(|(key, size)| {
            Ok(ObjectEntry {
                key: (*key).to_string(),
                size: *size,
            })
        })
        .collect()
}

/// The key-to-size mapping a correct document must encode: every key that
/// names a file, directory markers left out.
pub fn expected_mapping(items: &[(&str, u64)]) -> BTreeMap<String, u64> {
    items
        .iter()
        .filter(|(key, _)| !split_key(key).1.is_empty())
        .map(|(key, size)| ((*key).to_string(), *size))
        .collect()
}

/// Rebuild the key-to-size mapping from an ncdu document.
///
/// Directory names are joined with `/` below the root; the empty-name
/// placeholder maps back to an empty segment.
pub fn reconstruct(document: &Value) -> Result<BTreeMap<String, u64>, String> {
    let top = document.as_array().ok_or("document is not an array")?;
    if top.len() != 4 || top[0] != 1 || top[1] != 0 {
        return Err(format!("unexpected document header: {:?}", top.get(..2)));
    }
    let root = top[3].as_array().ok_or("root is not a directory")?;

    let mut files = BTreeMap::new();
    collect_children(root, "", &mut files)?;
    Ok(files)
}

fn collect_children(
    dir: &[Value],
    prefix: &str,
    files: &mut BTreeMap<String, u64>,
) -> Result<(), String> {
    let (head, children) = dir.split_first().ok_or("directory without a header")?;
    head.get("name")
        .and_then(Value::as_str)
        .ok_or("directory header without a name")?;

    for child in children {
        match child {
            Value::Array(sub) => {
                let name = entry_name(sub.first().ok_or("empty directory array")?)?;
                let segment = if name == EMPTY_NAME { "" } else { name };
                collect_children(sub, &format!("{}{}/", prefix, segment), files)?;
            }
            Value::Object(_) => {
                let name = entry_name(child)?;
                let size = child
                    .get("dsize")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| format!("file '{}' without dsize", name))?;
                files.insert(format!("{}{}", prefix, name), size);
            }
            other => return Err(format!("unexpected entry: {}", other)),
        }
    }
    Ok(())
}

fn entry_name(value: &Value) -> Result<&str, String> {
    value
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| format!("entry without a name: {}", value))
}

/// A temporary directory holding a JSON-lines listing manifest.
pub struct ManifestFixture {
    dir: TempDir,
    manifest: PathBuf,
}

impl ManifestFixture {
    /// Write `items` as a manifest in a fresh temporary directory.
    pub fn new(items: &[(&str, u64)]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let manifest = dir.path().join("listing.jsonl");
        let body: String = items
            .iter()
            .map(|(key, size)| {
                let entry = ObjectEntry {
                    key: (*key).to_string(),
                    size: *size,
                };
                serde_json::to_string(&entry).expect("Failed to encode entry") + "\n"
            })
            .collect();
        fs::write(&manifest, body).expect("Failed to write manifest");
        Self { dir, manifest }
    }

    /// Path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path to the manifest file.
    pub fn manifest(&self) -> &Path {
        &self.manifest
    }

    /// Path for an output file inside the temporary directory.
    pub fn output(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
