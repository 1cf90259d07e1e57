//! Review-state types recovered from prior PR comments.

use indexmap::IndexSet;

/// A prior review comment recognised by its embedded marker.
#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub comment_id: i64,
    pub thread_id: i64,
    /// Commit ids the comment claims to have covered.
    pub reviewed_commit_ids: IndexSet<String>,
    /// Iteration the review was computed against. Absent in reviews
    /// posted by older versions that only tracked commits.
    pub reviewed_iteration_id: Option<i64>,
    pub raw_content: String,
}

/// What kind of review this invocation should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewMode {
    /// Review the whole change-set.
    Full,
    /// Review only work introduced since the recorded iteration.
    Incremental,
    /// Every commit is already covered; do nothing.
    SkipNoNewWork,
}

impl std::fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewMode::Full => write!(f, "full"),
            ReviewMode::Incremental => write!(f, "incremental"),
            ReviewMode::SkipNoNewWork => write!(f, "skip (no new work)"),
        }
    }
}

/// The reconciled review state for one invocation.
///
/// Rebuilt from scratch every run; the system of record is the remote
/// comment thread, never local storage.
#[derive(Debug, Clone)]
pub struct ReviewState {
    /// Every commit currently on the PR, in host order.
    pub all_commit_ids: Vec<String>,
    /// Union of commit ids covered by prior marked comments.
    pub reviewed_commit_ids: IndexSet<String>,
    /// `all_commit_ids` minus `reviewed_commit_ids`, order preserved.
    pub new_commit_ids: Vec<String>,
    pub mode: ReviewMode,
    /// Lower bound for an incremental diff, from the canonical comment.
    pub from_iteration_id: Option<i64>,
    /// Thread/comment to update in place, when a prior review exists.
    pub canonical: Option<CanonicalComment>,
    /// Raw body of the canonical comment, kept for folding into the
    /// next posted review.
    pub prior_review_body: Option<String>,
}

/// Location of the most recently posted marked comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalComment {
    pub thread_id: i64,
    pub comment_id: i64,
}

impl ReviewState {
    pub fn has_prior_review(&self) -> bool {
        self.canonical.is_some()
    }
}
