//! Shared types used across all modules.
//!
//! Core data structures for changed files, diffs, and review state.
//! Other modules import from here rather than reaching into each
//! other's internals.

pub mod diff;
pub mod review;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use diff::{ChangeSetDocument, DiffSection, EditKind, EditOp, Hunk};
pub use review::{ReviewMode, ReviewRecord, ReviewState};

/// How a file changed within a PR iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Edit,
    Delete,
    Rename,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Add => write!(f, "added"),
            ChangeKind::Edit => write!(f, "edited"),
            ChangeKind::Delete => write!(f, "deleted"),
            ChangeKind::Rename => write!(f, "renamed"),
        }
    }
}

/// One entry in a PR's changed-file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub kind: ChangeKind,
    /// Pre-rename path, present only for renames.
    pub original_path: Option<String>,
}

impl FileChange {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
            original_path: None,
        }
    }

    /// The path holding the old content (pre-rename path for renames).
    pub fn old_path(&self) -> &str {
        self.original_path.as_deref().unwrap_or(&self.path)
    }
}

/// Both sides of one changed file, resolved and ready to diff.
///
/// Created per changed file while assembling a change-set; consumed by
/// the diff resolver and not retained afterwards. A missing side means
/// the content does not exist at that revision (added/deleted files).
#[derive(Debug, Clone)]
pub struct FileVersionPair {
    pub path: String,
    pub old_text: Option<String>,
    pub new_text: Option<String>,
    pub kind: ChangeKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_kind_display() {
        assert_eq!(ChangeKind::Add.to_string(), "added");
        assert_eq!(ChangeKind::Edit.to_string(), "edited");
        assert_eq!(ChangeKind::Delete.to_string(), "deleted");
        assert_eq!(ChangeKind::Rename.to_string(), "renamed");
    }

    #[test]
    fn change_kind_serde() {
        let json = serde_json::to_string(&ChangeKind::Rename).unwrap();
        assert_eq!(json, "\"rename\"");
        let back: ChangeKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ChangeKind::Rename);
    }
}
