//! Incremental scope filtering.
//!
//! Narrows an assembled change-set to the files actually touched by the
//! unreviewed commits. An empty result is surfaced as a distinct
//! outcome rather than an empty document, so the caller can fall back
//! to the full change-set instead of silently reviewing nothing.

use std::collections::HashSet;

use crate::host::{ChangeListProvider, ChangeScope, HostError};
use crate::models::diff::ChangeSetDocument;

/// Result of scoping a document to a set of touched paths.
#[derive(Debug, Clone)]
pub enum ScopeOutcome {
    Scoped(ChangeSetDocument),
    /// No rendered section matched; the caller must use the full
    /// document instead.
    EmptyScope,
}

/// Union of the file paths touched by each of the given commits.
pub async fn paths_touched_by_commits(
    provider: &dyn ChangeListProvider,
    pr_id: u64,
    commit_ids: &[String],
) -> Result<HashSet<String>, HostError> {
    let mut touched = HashSet::new();
    for commit_id in commit_ids {
        let changes = provider
            .list_changes(pr_id, ChangeScope::Commit(commit_id.clone()))
            .await?;
        touched.extend(changes.into_iter().map(|c| c.path));
    }
    Ok(touched)
}

/// Keep only the sections whose path is in `touched`.
///
/// The document's file counts are rewritten to match; informational
/// sections without a path (truncation notices) are preserved.
pub fn scope_to_paths(doc: &ChangeSetDocument, touched: &HashSet<String>) -> ScopeOutcome {
    let sections: Vec<_> = doc
        .sections
        .iter()
        .filter(|s| s.path.is_empty() || touched.contains(&s.path))
        .cloned()
        .collect();

    let kept = sections.iter().filter(|s| !s.path.is_empty()).count();
    if kept == 0 {
        return ScopeOutcome::EmptyScope;
    }

    // Rewrite the first header line; keep any range lines that follow.
    let tail = doc
        .header_text
        .split_once('\n')
        .map(|(_, rest)| format!("\n{rest}"))
        .unwrap_or_default();
    let header_text = format!(
        "Reviewing {kept} of {} changed file{}, scoped to newly pushed commits{tail}",
        doc.total_files,
        if doc.total_files == 1 { "" } else { "s" },
    );

    ScopeOutcome::Scoped(ChangeSetDocument {
        header_text,
        sections,
        total_files: doc.total_files,
        shown_files: kept,
        latest_iteration: doc.latest_iteration,
    })
}
