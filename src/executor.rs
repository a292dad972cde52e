//! Apply a rename plan one entry at a time.
//!
//! Entries are independent: a failure is recorded and the batch moves on.
//! There is no rollback and no retry.
use crate::reconcile::RenameEntry;
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// Why a single rename was not performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The proposed name was present when the entry was reached.
    TargetExists,
    /// A name in the entry is not a single component of `dir`.
    InvalidTarget,
    /// The OS rejected the rename.
    Io { message: String },
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::TargetExists => f.write_str("target already exists"),
            FailureReason::InvalidTarget => f.write_str("not a plain file name in the directory"),
            FailureReason::Io { message } => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameFailure {
    pub entry: RenameEntry,
    pub reason: FailureReason,
}

/// Per-entry outcomes of an executed plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub renamed: Vec<RenameEntry>,
    pub failures: Vec<RenameFailure>,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> usize {
        self.renamed.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Rename each entry inside `dir`, never replacing an existing name.
pub fn execute(dir: &Path, plan: &[RenameEntry]) -> ExecutionReport {
    let mut report = ExecutionReport::default();
    for entry in plan {
        match rename_one(dir, entry) {
            Ok(()) => {
                tracing::info!(from = %entry.from, to = %entry.to, "renamed");
                report.renamed.push(entry.clone());
            }
            Err(reason) => {
                tracing::warn!(from = %entry.from, to = %entry.to, %reason, "rename failed");
                report.failures.push(RenameFailure {
                    entry: entry.clone(),
                    reason,
                });
            }
        }
    }
    report
}

fn rename_one(dir: &Path, entry: &RenameEntry) -> Result<(), FailureReason> {
    if !is_plain_name(&entry.from) || !is_plain_name(&entry.to) {
        return Err(FailureReason::InvalidTarget);
    }
    let from = dir.join(&entry.from);
    let to = dir.join(&entry.to);
    // symlink_metadata so a dangling symlink at the target also blocks.
    if fs::symlink_metadata(&to).is_ok() {
        return Err(FailureReason::TargetExists);
    }
    fs::rename(&from, &to).map_err(|err| FailureReason::Io {
        message: err.to_string(),
    })
}

/// True when `name` joined onto a directory names an entry of that directory.
fn is_plain_name(name: &str) -> bool {
    Path::new(name).file_name() == Some(OsStr::new(name))
}
