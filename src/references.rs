//! Collect every `file` reference embedded in a manifest tree.
use crate::manifest::ManifestNode;
use std::collections::BTreeSet;

/// Key whose string value names an expected file.
pub const FILE_KEY: &str = "file";

/// Deduplicated set of referenced file names.
pub type FileReferenceSet = BTreeSet<String>;

/// Walk the tree depth-first and gather all non-empty `file` strings.
///
/// Uses an explicit stack so deeply nested manifests cannot exhaust the call
/// stack. Keys other than `file` are traversed but never collected.
pub fn extract_references(root: &ManifestNode) -> FileReferenceSet {
    let mut references = FileReferenceSet::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        match node {
            ManifestNode::Record(fields) => {
                if let Some(name) = fields.get(FILE_KEY).and_then(ManifestNode::as_str) {
                    if !name.is_empty() {
                        references.insert(name.to_string());
                    }
                }
                stack.extend(fields.values());
            }
            ManifestNode::Sequence(items) => stack.extend(items.iter()),
            ManifestNode::Scalar(_) => {}
        }
    }

    references
}
