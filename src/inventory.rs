//! One-shot snapshot of the regular files in a directory.
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// File names found in a directory, plus how many were unusable.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub files: BTreeSet<String>,
    /// Entries whose names are not valid UTF-8; they are never planned.
    pub non_utf8: usize,
}

/// List regular files (following symlinks) directly under `dir`.
pub fn list_regular_files(dir: &Path) -> Result<Inventory> {
    let mut inventory = Inventory::default();
    let entries = fs::read_dir(dir).with_context(|| format!("read directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read directory entry in {}", dir.display()))?;
        // fs::metadata follows symlinks, matching a plain "is this a file" check.
        let is_file = fs::metadata(entry.path())
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => {
                inventory.files.insert(name);
            }
            Err(raw) => {
                tracing::warn!(name = ?raw, "skipping file with non-UTF-8 name");
                inventory.non_utf8 += 1;
            }
        }
    }
    tracing::debug!(
        dir = %dir.display(),
        files = inventory.files.len(),
        "directory listed"
    );
    Ok(inventory)
}
