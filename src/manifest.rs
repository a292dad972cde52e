//! Manifest model and loading.
//!
//! The manifest is schema-free JSON. It is lifted into `ManifestNode` so the
//! extractor and index builder can match on shape instead of probing
//! `serde_json::Value` accessors.
use anyhow::{anyhow, Context, Result};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default manifest file name, resolved against the target directory.
pub const DEFAULT_MANIFEST: &str = "cave.json";

/// Untyped recursive manifest value.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestNode {
    Record(BTreeMap<String, ManifestNode>),
    Sequence(Vec<ManifestNode>),
    Scalar(Scalar),
}

/// Leaf values carried by a manifest.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl ManifestNode {
    /// Field lookup on a record; `None` for sequences and scalars.
    pub fn field(&self, key: &str) -> Option<&ManifestNode> {
        match self {
            ManifestNode::Record(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ManifestNode::Scalar(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ManifestNode]> {
        match self {
            ManifestNode::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Value> for ManifestNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => ManifestNode::Record(
                map.into_iter()
                    .map(|(key, value)| (key, ManifestNode::from(value)))
                    .collect(),
            ),
            Value::Array(items) => {
                ManifestNode::Sequence(items.into_iter().map(ManifestNode::from).collect())
            }
            Value::Null => ManifestNode::Scalar(Scalar::Null),
            Value::Bool(value) => ManifestNode::Scalar(Scalar::Bool(value)),
            Value::Number(value) => ManifestNode::Scalar(Scalar::Number(value)),
            Value::String(value) => ManifestNode::Scalar(Scalar::String(value)),
        }
    }
}

/// Resolve the manifest path against the target directory.
pub fn manifest_path(dir: &Path, manifest: &Path) -> PathBuf {
    if manifest.is_absolute() {
        manifest.to_path_buf()
    } else {
        dir.join(manifest)
    }
}

/// Load and parse a manifest file.
///
/// A missing file and malformed JSON are reported with distinct messages;
/// both abort the run before anything is listed or renamed.
pub fn load_manifest(path: &Path) -> Result<ManifestNode> {
    if !path.is_file() {
        return Err(anyhow!("manifest not found at {}", path.display()));
    }
    let bytes = fs::read(path).with_context(|| format!("read manifest {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse manifest JSON {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "manifest loaded");
    Ok(ManifestNode::from(value))
}
