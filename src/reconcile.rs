//! Diff and rename planning over an in-memory directory snapshot.
//!
//! Nothing here touches the filesystem: callers hand in the file names they
//! listed and the names to leave alone, so every outcome is reproducible from
//! plain sets.
use crate::filename::ParsedFilename;
use crate::index::ManifestIndex;
use crate::references::FileReferenceSet;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Result of comparing referenced files with the directory contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub referenced: usize,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
}

impl DiffReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// `missing = expected - actual`, `extra = actual - expected - ignored`.
pub fn diff(
    expected: &FileReferenceSet,
    actual: &BTreeSet<String>,
    ignored: &BTreeSet<String>,
) -> DiffReport {
    let missing = expected.difference(actual).cloned().collect();
    let extra = actual
        .iter()
        .filter(|name| !expected.contains(*name) && !ignored.contains(*name))
        .cloned()
        .collect();
    DiffReport {
        referenced: expected.len(),
        missing,
        extra,
    }
}

/// One pending rename inside the target directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameEntry {
    pub from: String,
    pub to: String,
}

/// Category assigned to a file during rename planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Correct,
    NeedsRename(String),
    /// The manifest ids for this file cannot form a conforming name.
    Unrenamable,
    Unmatched,
    Unrecognized,
}

/// Decide what to do with a single file name.
pub fn classify(name: &str, index: &ManifestIndex) -> Classification {
    let Some(parsed) = ParsedFilename::parse(name) else {
        return Classification::Unrecognized;
    };
    let Some(expected) = parsed.numeric_id().and_then(|id| index.get(id)) else {
        return Classification::Unmatched;
    };
    if parsed.channel_id == expected.channel_id && parsed.user_id == expected.user_id {
        return Classification::Correct;
    }
    match parsed.retarget(&expected.channel_id, &expected.user_id) {
        Some(to) => Classification::NeedsRename(to),
        None => Classification::Unrenamable,
    }
}

/// Partition of the snapshot into the rename-mode categories.
///
/// Every list is sorted by file name and together they cover each
/// considered file exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenamePlan {
    pub renames: Vec<RenameEntry>,
    pub correct: Vec<String>,
    /// Matched files whose manifest ids are not plain digit runs.
    pub unrenamable: Vec<String>,
    pub unmatched: Vec<String>,
    pub unrecognized: Vec<String>,
    /// Snapshot names the plan was computed against, used for conflict checks.
    #[serde(skip)]
    snapshot: BTreeSet<String>,
}

impl RenamePlan {
    /// True when nothing needs renaming and nothing was left unclassified.
    pub fn is_clean(&self) -> bool {
        self.renames.is_empty()
            && self.unrenamable.is_empty()
            && self.unmatched.is_empty()
            && self.unrecognized.is_empty()
    }

    /// Total number of files that were classified.
    pub fn considered(&self) -> usize {
        self.renames.len()
            + self.correct.len()
            + self.unrenamable.len()
            + self.unmatched.len()
            + self.unrecognized.len()
    }

    /// Targets that already exist in the snapshot or that several entries share.
    ///
    /// Execution still re-checks each target; this only lets the preview warn
    /// before the operator confirms.
    pub fn conflicts(&self) -> Vec<String> {
        let mut targets: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in &self.renames {
            *targets.entry(entry.to.as_str()).or_default() += 1;
        }
        targets
            .into_iter()
            .filter(|(target, count)| *count > 1 || self.snapshot.contains(*target))
            .map(|(target, _)| target.to_string())
            .collect()
    }
}

/// Classify every file in `actual - excluded` against the manifest index.
pub fn plan(
    actual: &BTreeSet<String>,
    index: &ManifestIndex,
    excluded: &BTreeSet<String>,
) -> RenamePlan {
    let mut result = RenamePlan {
        snapshot: actual.clone(),
        ..RenamePlan::default()
    };
    for name in actual.iter().filter(|name| !excluded.contains(*name)) {
        match classify(name, index) {
            Classification::Correct => result.correct.push(name.clone()),
            Classification::NeedsRename(to) => result.renames.push(RenameEntry {
                from: name.clone(),
                to,
            }),
            Classification::Unrenamable => {
                tracing::warn!(file = %name, "manifest ids cannot form a file name");
                result.unrenamable.push(name.clone());
            }
            Classification::Unmatched => result.unmatched.push(name.clone()),
            Classification::Unrecognized => result.unrecognized.push(name.clone()),
        }
    }
    tracing::debug!(
        considered = result.considered(),
        renames = result.renames.len(),
        correct = result.correct.len(),
        unrenamable = result.unrenamable.len(),
        unmatched = result.unmatched.len(),
        unrecognized = result.unrecognized.len(),
        "rename plan computed"
    );
    result
}
