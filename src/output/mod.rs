//! Review publishing and terminal summary.
//!
//! Composes the comment body that carries both the review prose and the
//! state marker, posts or updates it through the comment store, and
//! prints a colored one-screen summary for the invoking terminal.

use colored::Colorize;
use indexmap::IndexSet;

use crate::host::{CommentStore, HostError};
use crate::models::review::{ReviewMode, ReviewState};
use crate::state::marker;

/// Where the review ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A new comment thread was created.
    Posted { thread_id: i64, comment_id: i64 },
    /// The canonical comment was rewritten in place.
    Updated { thread_id: i64, comment_id: i64 },
    /// Dry run; nothing was sent to the host.
    Skipped,
}

/// Compose the full comment body for a review.
///
/// Layout matters: the previous review is folded into a `<details>`
/// block so the marker scanner ignores its embedded markers, and the
/// fresh marker goes last so it is the only one visible at the top
/// level. The marker records the union of previously reviewed commits
/// and everything on the PR now.
pub fn compose_comment_body(
    review_text: &str,
    state: &ReviewState,
    latest_iteration: i64,
) -> String {
    let mut covered: IndexSet<String> = state.reviewed_commit_ids.clone();
    covered.extend(state.all_commit_ids.iter().cloned());
    let commit_ids: Vec<String> = covered.into_iter().collect();

    let mut body = String::new();
    body.push_str(review_text.trim_end());
    body.push('\n');

    if let Some(prior) = state.prior_review_body.as_deref() {
        body.push('\n');
        body.push_str("<details>\n<summary>Previous review</summary>\n\n");
        body.push_str(prior.trim_end());
        body.push_str("\n\n</details>\n");
    }

    body.push('\n');
    body.push_str(&marker::render_marker(&commit_ids, Some(latest_iteration)));
    body.push('\n');
    body
}

/// Post the composed body, updating the canonical comment when one
/// exists so a PR accumulates one review thread instead of many.
pub async fn publish_review(
    store: &dyn CommentStore,
    pr_id: u64,
    body: &str,
    state: &ReviewState,
    dry_run: bool,
) -> Result<PublishOutcome, HostError> {
    if dry_run {
        return Ok(PublishOutcome::Skipped);
    }

    if let Some(canonical) = state.canonical {
        store
            .update_comment(pr_id, canonical.thread_id, canonical.comment_id, body)
            .await?;
        return Ok(PublishOutcome::Updated {
            thread_id: canonical.thread_id,
            comment_id: canonical.comment_id,
        });
    }

    let posted = store.post_comment(pr_id, body).await?;
    Ok(PublishOutcome::Posted {
        thread_id: posted.thread_id,
        comment_id: posted.id,
    })
}

/// Render the colored terminal summary for one invocation.
pub fn terminal_summary(
    pr_id: u64,
    state: &ReviewState,
    shown_files: usize,
    total_files: usize,
    outcome: &PublishOutcome,
) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        " {} PR {} — {} review\n",
        "●".cyan().bold(),
        pr_id.to_string().bold(),
        state.mode.to_string().bold(),
    ));

    if state.mode == ReviewMode::SkipNoNewWork {
        out.push_str(&format!(
            "   {}\n",
            "All commits already reviewed; nothing to do.".green()
        ));
        return out;
    }

    out.push_str(&format!(
        "   {} of {} changed files reviewed, {} new of {} commits\n",
        shown_files.to_string().bold(),
        total_files,
        state.new_commit_ids.len().to_string().bold(),
        state.all_commit_ids.len(),
    ));

    match outcome {
        PublishOutcome::Posted { thread_id, .. } => {
            out.push_str(&format!(
                "   {} review posted as new thread {thread_id}\n",
                "✔".green().bold()
            ));
        }
        PublishOutcome::Updated { comment_id, .. } => {
            out.push_str(&format!(
                "   {} review comment {comment_id} updated in place\n",
                "✔".green().bold()
            ));
        }
        PublishOutcome::Skipped => {
            out.push_str(&format!(
                "   {} dry run — review not posted\n",
                "→".yellow()
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::PrComment;
    use crate::models::review::CanonicalComment;
    use crate::state::marker::{scan_marker, MarkerScan};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn state(prior: Option<&str>) -> ReviewState {
        ReviewState {
            all_commit_ids: vec!["c1".into(), "c2".into()],
            reviewed_commit_ids: ["c1".to_string()].into_iter().collect(),
            new_commit_ids: vec!["c2".into()],
            mode: ReviewMode::Full,
            from_iteration_id: None,
            canonical: prior.map(|_| CanonicalComment {
                thread_id: 7,
                comment_id: 70,
            }),
            prior_review_body: prior.map(str::to_string),
        }
    }

    #[test]
    fn composed_body_round_trips_through_scanner() {
        let body = compose_comment_body("Looks good.", &state(None), 4);
        match scan_marker(&body) {
            MarkerScan::Found(payload) => {
                assert_eq!(payload.commit_ids, vec!["c1", "c2"]);
                assert_eq!(payload.iteration_id, Some(4));
            }
            other => panic!("expected marker, got {other:?}"),
        }
        assert!(body.starts_with("Looks good."));
    }

    #[test]
    fn prior_review_folded_into_details() {
        let prior = format!(
            "Old review.\n{}",
            marker::render_marker(&["c1".to_string()], Some(2))
        );
        let body = compose_comment_body("New review.", &state(Some(&prior)), 4);
        assert!(body.contains("<details>"));
        assert!(body.contains("Old review."));

        // The scanner must see only the fresh top-level marker.
        match scan_marker(&body) {
            MarkerScan::Found(payload) => {
                assert_eq!(payload.iteration_id, Some(4));
                assert_eq!(payload.commit_ids, vec!["c1", "c2"]);
            }
            other => panic!("expected marker, got {other:?}"),
        }
    }

    #[test]
    fn commit_union_preserves_first_seen_order() {
        let mut st = state(None);
        st.reviewed_commit_ids = ["c9".to_string()].into_iter().collect();
        let body = compose_comment_body("r", &st, 1);
        match scan_marker(&body) {
            MarkerScan::Found(payload) => {
                assert_eq!(payload.commit_ids, vec!["c9", "c1", "c2"]);
            }
            other => panic!("expected marker, got {other:?}"),
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        posted: Mutex<Vec<String>>,
        updated: Mutex<Vec<(i64, i64, String)>>,
    }

    #[async_trait]
    impl CommentStore for RecordingStore {
        async fn list_comments(&self, _pr_id: u64) -> Result<Vec<PrComment>, HostError> {
            Ok(Vec::new())
        }

        async fn post_comment(&self, _pr_id: u64, body: &str) -> Result<PrComment, HostError> {
            self.posted.lock().unwrap().push(body.to_string());
            Ok(PrComment {
                id: 100,
                thread_id: 10,
                body: body.to_string(),
                posted_at: "2026-01-01T00:00:00Z".into(),
            })
        }

        async fn update_comment(
            &self,
            _pr_id: u64,
            thread_id: i64,
            comment_id: i64,
            body: &str,
        ) -> Result<(), HostError> {
            self.updated
                .lock()
                .unwrap()
                .push((thread_id, comment_id, body.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn publishes_new_thread_without_prior_review() {
        let store = RecordingStore::default();
        let outcome = publish_review(&store, 1, "body", &state(None), false)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PublishOutcome::Posted {
                thread_id: 10,
                comment_id: 100
            }
        );
        assert_eq!(store.posted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn updates_canonical_comment_in_place() {
        let store = RecordingStore::default();
        let outcome = publish_review(&store, 1, "body", &state(Some("old")), false)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PublishOutcome::Updated {
                thread_id: 7,
                comment_id: 70
            }
        );
        let updated = store.updated.lock().unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].0, 7);
        assert_eq!(updated[0].1, 70);
    }

    #[tokio::test]
    async fn dry_run_sends_nothing() {
        let store = RecordingStore::default();
        let outcome = publish_review(&store, 1, "body", &state(Some("old")), true)
            .await
            .unwrap();
        assert_eq!(outcome, PublishOutcome::Skipped);
        assert!(store.posted.lock().unwrap().is_empty());
        assert!(store.updated.lock().unwrap().is_empty());
    }

    #[test]
    fn summary_mentions_skip_mode() {
        colored::control::set_override(false);
        let mut st = state(None);
        st.mode = ReviewMode::SkipNoNewWork;
        let out = terminal_summary(5, &st, 0, 0, &PublishOutcome::Skipped);
        assert!(out.contains("already reviewed"));
        colored::control::unset_override();
    }

    #[test]
    fn summary_mentions_dry_run() {
        colored::control::set_override(false);
        let out = terminal_summary(5, &state(None), 3, 4, &PublishOutcome::Skipped);
        assert!(out.contains("dry run"));
        assert!(out.contains("3 of 4 changed files"));
        colored::control::unset_override();
    }
}
