//! Authoritative id → (channelId, userId) table built from the manifest.
use crate::manifest::{ManifestNode, Scalar};
use serde::Serialize;
use serde_json::Number;
use std::collections::{BTreeMap, BTreeSet};

pub const ID_KEY: &str = "id";
pub const CHANNEL_KEY: &str = "channelId";
pub const USER_KEY: &str = "userId";

/// Ownership metadata for one manifest id, normalized to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub channel_id: String,
    pub user_id: String,
}

/// Lookup table plus what was dropped while building it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ManifestIndex {
    entries: BTreeMap<u64, ManifestEntry>,
    /// Top-level items that were not records or lacked a usable field.
    pub skipped: usize,
    /// Ids that appeared more than once; the last occurrence won.
    pub duplicates: BTreeSet<u64>,
}

impl ManifestIndex {
    pub fn get(&self, id: u64) -> Option<&ManifestEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert, overwriting any previous entry for `id`.
    pub fn insert(&mut self, id: u64, entry: ManifestEntry) {
        if self.entries.insert(id, entry).is_some() {
            self.duplicates.insert(id);
        }
    }
}

/// Build the index from the manifest's top-level list.
///
/// Items missing `id`, `channelId` or `userId` are skipped silently here;
/// callers read `skipped` and `duplicates` if they want to report them.
pub fn build_index(entries: &[ManifestNode]) -> ManifestIndex {
    let mut index = ManifestIndex::default();
    for item in entries {
        match entry_from_node(item) {
            Some((id, entry)) => index.insert(id, entry),
            None => index.skipped += 1,
        }
    }
    tracing::debug!(
        indexed = index.len(),
        skipped = index.skipped,
        duplicates = index.duplicates.len(),
        "manifest index built"
    );
    index
}

fn entry_from_node(item: &ManifestNode) -> Option<(u64, ManifestEntry)> {
    let id = match item.field(ID_KEY)? {
        ManifestNode::Scalar(Scalar::Number(number)) => integral_id(number)?,
        _ => return None,
    };
    let channel_id = scalar_text(item.field(CHANNEL_KEY)?)?;
    let user_id = scalar_text(item.field(USER_KEY)?)?;
    Some((
        id,
        ManifestEntry {
            channel_id,
            user_id,
        },
    ))
}

/// Whole, in-range JSON numbers are ids, so `1.0` is id 1.
fn integral_id(number: &Number) -> Option<u64> {
    number.as_u64().or_else(|| {
        number
            .as_f64()
            .filter(|value| value.fract() == 0.0 && *value >= 0.0 && *value < u64::MAX as f64)
            .map(|value| value as u64)
    })
}

/// String form used for comparison against filename digits.
fn scalar_text(node: &ManifestNode) -> Option<String> {
    match node {
        ManifestNode::Scalar(Scalar::String(value)) => Some(value.clone()),
        ManifestNode::Scalar(Scalar::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}
