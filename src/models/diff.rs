//! Diff-related types: edit scripts, hunks, and change-set documents.

use serde::{Deserialize, Serialize};

/// The kind of a single edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// Line is unchanged (present in both versions).
    Keep,
    /// Line exists only in the new version.
    Add,
    /// Line exists only in the old version.
    Del,
}

/// One line-level operation in an edit script.
///
/// Replaying `Keep` + `Del` ops reconstructs the old text exactly;
/// `Keep` + `Add` reconstructs the new text exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOp {
    pub kind: EditKind,
    pub text: String,
    /// 1-based line number in the old file (`None` for `Add`).
    pub old_line_no: Option<u32>,
    /// 1-based line number in the new file (`None` for `Del`).
    pub new_line_no: Option<u32>,
}

impl EditOp {
    pub fn keep(text: impl Into<String>, old: u32, new: u32) -> Self {
        Self {
            kind: EditKind::Keep,
            text: text.into(),
            old_line_no: Some(old),
            new_line_no: Some(new),
        }
    }

    pub fn add(text: impl Into<String>, new: u32) -> Self {
        Self {
            kind: EditKind::Add,
            text: text.into(),
            old_line_no: None,
            new_line_no: Some(new),
        }
    }

    pub fn del(text: impl Into<String>, old: u32) -> Self {
        Self {
            kind: EditKind::Del,
            text: text.into(),
            old_line_no: Some(old),
            new_line_no: None,
        }
    }
}

/// A contiguous, context-padded block of an edit script.
#[derive(Debug, Clone)]
pub struct Hunk {
    /// 1-based start line in the old file; 0 when the hunk only
    /// inserts lines before the first old line.
    pub start_old: u32,
    /// 1-based start line in the new file; 0 for a pure deletion
    /// before the first new line.
    pub start_new: u32,
    pub ops: Vec<EditOp>,
}

/// The rendered diff for one changed file.
#[derive(Debug, Clone)]
pub struct DiffSection {
    /// File path this section describes.
    pub path: String,
    /// Section header line (path plus change kind).
    pub header: String,
    /// Rendered hunk text (or a fixed/degraded body).
    pub body: String,
    /// Whether the body hit its character budget.
    pub truncated: bool,
}

impl DiffSection {
    /// Character length of this section as it will appear in a document.
    pub fn char_len(&self) -> usize {
        self.header.len() + self.body.len() + 2
    }
}

/// An assembled change-set: one document covering a PR revision range.
#[derive(Debug, Clone)]
pub struct ChangeSetDocument {
    /// Document header (file counts, iteration range).
    pub header_text: String,
    pub sections: Vec<DiffSection>,
    /// Total changed files before capping.
    pub total_files: usize,
    /// Files actually rendered into `sections`.
    pub shown_files: usize,
    /// The PR iteration the new side of the diff was taken from.
    pub latest_iteration: i64,
}

impl ChangeSetDocument {
    /// Render the full document as plain text.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(1024);
        out.push_str(&self.header_text);
        out.push('\n');
        for section in &self.sections {
            out.push('\n');
            out.push_str(&section.header);
            out.push('\n');
            out.push_str(&section.body);
            if !section.body.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }

    /// Paths of every rendered section, in document order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.path.as_str())
    }
}
