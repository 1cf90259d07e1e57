//! Review-state tracking.
//!
//! Recovers what previous invocations already reviewed from the PR's
//! comment threads — the comment store is the system of record; nothing
//! is persisted locally. Reconciles that against the PR's current
//! commit list and decides whether this run reviews everything, only
//! the new work, or nothing at all.

pub mod marker;
pub mod scope;

use indexmap::IndexSet;

use crate::host::{CommentStore, CommitLister, HostError};
use crate::models::review::{CanonicalComment, ReviewMode, ReviewRecord, ReviewState};

use marker::MarkerScan;

/// Flags that drive the mode decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackerOptions {
    /// Scope re-review to work since the last recorded iteration.
    pub incremental: bool,
    /// Skip entirely when every commit is already covered.
    pub skip_if_reviewed: bool,
}

/// Compute the review state for one invocation.
///
/// Reviewed-commit policy: ids are unioned across every marked comment,
/// not just the latest one — a commit once recorded as reviewed is never
/// re-flagged, even if a later comment omits it. The iteration lower
/// bound, in contrast, comes from the canonical (most recent) comment
/// only.
///
/// A failing comment listing degrades to "no prior review" rather than
/// aborting; a failing commit listing is surfaced to the caller.
pub async fn compute_review_state(
    comments: &dyn CommentStore,
    commits: &dyn CommitLister,
    pr_id: u64,
    opts: &TrackerOptions,
) -> Result<ReviewState, HostError> {
    let all_commit_ids = commits.list_commits(pr_id).await?;

    let comment_list = match comments.list_comments(pr_id).await {
        Ok(list) => list,
        Err(e) => {
            eprintln!("Warning: could not list PR comments ({e}); assuming no prior review");
            Vec::new()
        }
    };

    let records = recover_records(&comment_list);

    let mut reviewed_commit_ids: IndexSet<String> = IndexSet::new();
    for record in &records {
        reviewed_commit_ids.extend(record.reviewed_commit_ids.iter().cloned());
    }

    let canonical_record = records.last();
    let canonical = canonical_record.map(|r| CanonicalComment {
        thread_id: r.thread_id,
        comment_id: r.comment_id,
    });
    let from_iteration_id = canonical_record.and_then(|r| r.reviewed_iteration_id);
    let prior_review_body = canonical_record.map(|r| r.raw_content.clone());

    let new_commit_ids: Vec<String> = all_commit_ids
        .iter()
        .filter(|id| !reviewed_commit_ids.contains(*id))
        .cloned()
        .collect();

    let mode = decide_mode(
        opts,
        canonical.is_some(),
        new_commit_ids.is_empty(),
        from_iteration_id.is_some(),
    );

    Ok(ReviewState {
        all_commit_ids,
        reviewed_commit_ids,
        new_commit_ids,
        mode,
        from_iteration_id,
        canonical,
        prior_review_body,
    })
}

/// Recover marked-comment records in posting order.
fn recover_records(comments: &[crate::host::PrComment]) -> Vec<ReviewRecord> {
    comments
        .iter()
        .filter_map(|comment| match marker::scan_marker(&comment.body) {
            MarkerScan::Absent => None,
            // Fail open: a malformed payload still marks a prior
            // review, it just covered nothing extractable.
            MarkerScan::Malformed => Some(ReviewRecord {
                comment_id: comment.id,
                thread_id: comment.thread_id,
                reviewed_commit_ids: IndexSet::new(),
                reviewed_iteration_id: None,
                raw_content: comment.body.clone(),
            }),
            MarkerScan::Found(payload) => Some(ReviewRecord {
                comment_id: comment.id,
                thread_id: comment.thread_id,
                reviewed_commit_ids: payload.commit_ids.into_iter().collect(),
                reviewed_iteration_id: payload.iteration_id,
                raw_content: comment.body.clone(),
            }),
        })
        .collect()
}

fn decide_mode(
    opts: &TrackerOptions,
    has_prior: bool,
    nothing_new: bool,
    has_iteration_bound: bool,
) -> ReviewMode {
    if !has_prior {
        return ReviewMode::Full;
    }
    if nothing_new && (opts.skip_if_reviewed || opts.incremental) {
        return ReviewMode::SkipNoNewWork;
    }
    if opts.incremental && !nothing_new && has_iteration_bound {
        return ReviewMode::Incremental;
    }
    ReviewMode::Full
}
