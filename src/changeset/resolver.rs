//! Per-file diff resolution.
//!
//! Fetches both sides of one changed file, dispatches to a matcher,
//! and renders a [`DiffSection`]. Failure isolation is the contract
//! here: a fetch error degrades the section to an annotated preview;
//! it never escapes to the caller, so sibling files always render.

use crate::constants::TRUNCATION_NOTICE;
use crate::diff::{self, render};
use crate::host::{ContentFetcher, HostError, RevisionPair};
use crate::models::diff::DiffSection;
use crate::models::{ChangeKind, FileChange, FileVersionPair};

/// Knobs for resolving one file.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub revisions: RevisionPair,
    pub max_file_chars: usize,
    pub context_lines: usize,
    pub cost_ceiling: usize,
}

/// Resolve one changed file into a rendered section.
///
/// Always returns a section; errors are folded into a degraded body.
pub async fn resolve_file(
    fetcher: &dyn ContentFetcher,
    change: &FileChange,
    opts: &ResolveOptions,
) -> DiffSection {
    let header = section_header(change);

    if change.kind == ChangeKind::Delete {
        return DiffSection {
            path: change.path.clone(),
            header,
            body: "(File deleted)".to_string(),
            truncated: false,
        };
    }

    let new_text = match fetcher.fetch(&change.path, &opts.revisions.new).await {
        Ok(Some(text)) => Some(text),
        Ok(None) => {
            return DiffSection {
                path: change.path.clone(),
                header,
                body: format!("(file not found at revision {})", opts.revisions.new),
                truncated: false,
            };
        }
        Err(e) => {
            return degraded(change, header, &e, None, opts.max_file_chars);
        }
    };

    let pair = match change.kind {
        ChangeKind::Add => FileVersionPair {
            path: change.path.clone(),
            old_text: None,
            new_text,
            kind: change.kind,
        },
        _ => {
            // Edit/Rename need the old side too.
            match fetcher.fetch(change.old_path(), &opts.revisions.old).await {
                Ok(old_text) => FileVersionPair {
                    path: change.path.clone(),
                    old_text,
                    new_text,
                    kind: change.kind,
                },
                Err(e) => {
                    return degraded(change, header, &e, new_text.as_deref(), opts.max_file_chars);
                }
            }
        }
    };

    diff_pair(pair, header, opts)
}

/// Diff a resolved version pair and render it under the file budget.
fn diff_pair(pair: FileVersionPair, header: String, opts: &ResolveOptions) -> DiffSection {
    let new_text = pair.new_text.unwrap_or_default();
    let old_text = pair.old_text.unwrap_or_default();

    let ops = diff::diff_lines(&old_text, &new_text, opts.cost_ceiling);
    let rendered = render::render(&ops, opts.context_lines, opts.max_file_chars);

    let body = if rendered.text.is_empty() {
        "(no line changes)".to_string()
    } else {
        rendered.text
    };

    DiffSection {
        path: pair.path,
        header,
        body,
        truncated: rendered.truncated,
    }
}

/// Render a degraded section when content could not be fetched.
fn degraded(
    change: &FileChange,
    header: String,
    err: &HostError,
    preview: Option<&str>,
    max_chars: usize,
) -> DiffSection {
    let mut body = format!("(could not fetch file content: {err})");
    let mut truncated = false;
    if let Some(text) = preview {
        body.push_str("\nNew content preview:\n");
        for line in text.lines() {
            if body.len() + line.len() + 1 > max_chars {
                body.push_str(TRUNCATION_NOTICE);
                body.push('\n');
                truncated = true;
                break;
            }
            body.push_str(line);
            body.push('\n');
        }
    }
    DiffSection {
        path: change.path.clone(),
        header,
        body,
        truncated,
    }
}

fn section_header(change: &FileChange) -> String {
    match (&change.kind, &change.original_path) {
        (ChangeKind::Rename, Some(original)) => {
            format!("### {} ({} from {original})", change.path, change.kind)
        }
        _ => format!("### {} ({})", change.path, change.kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// In-memory fetcher keyed by `(path, revision)`.
    struct MapFetcher {
        files: HashMap<(String, String), String>,
        fail_on: Option<String>,
    }

    impl MapFetcher {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            Self {
                files: entries
                    .iter()
                    .map(|(p, r, t)| ((p.to_string(), r.to_string()), t.to_string()))
                    .collect(),
                fail_on: None,
            }
        }
    }

    #[async_trait]
    impl ContentFetcher for MapFetcher {
        async fn fetch(&self, path: &str, revision: &str) -> Result<Option<String>, HostError> {
            if self.fail_on.as_deref() == Some(revision) {
                return Err(HostError::Transport("connection reset".into()));
            }
            Ok(self
                .files
                .get(&(path.to_string(), revision.to_string()))
                .cloned())
        }
    }

    fn opts() -> ResolveOptions {
        ResolveOptions {
            revisions: RevisionPair {
                old: "old-rev".into(),
                new: "new-rev".into(),
                from_iteration: None,
                latest_iteration: 1,
            },
            max_file_chars: 8_000,
            context_lines: 3,
            cost_ceiling: 300_000,
        }
    }

    #[tokio::test]
    async fn delete_renders_fixed_body_without_fetching() {
        let fetcher = MapFetcher::new(&[]);
        let change = FileChange::new("/src/gone.rs", ChangeKind::Delete);
        let section = resolve_file(&fetcher, &change, &opts()).await;
        assert_eq!(section.body, "(File deleted)");
        assert!(!section.truncated);
    }

    #[tokio::test]
    async fn add_renders_all_addition_lines() {
        let fetcher = MapFetcher::new(&[("/src/new.rs", "new-rev", "line1\nline2")]);
        let change = FileChange::new("/src/new.rs", ChangeKind::Add);
        let section = resolve_file(&fetcher, &change, &opts()).await;
        assert!(section.body.contains("+ line1"));
        assert!(section.body.contains("+ line2"));
        assert!(!section.body.contains("- "));
    }

    #[tokio::test]
    async fn edit_diffs_both_sides() {
        let fetcher = MapFetcher::new(&[
            ("/src/a.rs", "old-rev", "a\nb\nc"),
            ("/src/a.rs", "new-rev", "a\nx\nc"),
        ]);
        let change = FileChange::new("/src/a.rs", ChangeKind::Edit);
        let section = resolve_file(&fetcher, &change, &opts()).await;
        assert!(section.body.contains("- b"));
        assert!(section.body.contains("+ x"));
        assert!(section.body.contains("  a"));
    }

    #[tokio::test]
    async fn fetch_failure_degrades_to_preview() {
        let mut fetcher = MapFetcher::new(&[("/src/a.rs", "new-rev", "new content here")]);
        fetcher.fail_on = Some("old-rev".into());
        let change = FileChange::new("/src/a.rs", ChangeKind::Edit);
        let section = resolve_file(&fetcher, &change, &opts()).await;
        assert!(section.body.contains("could not fetch file content"));
        assert!(section.body.contains("new content here"));
    }

    #[tokio::test]
    async fn rename_fetches_old_content_at_original_path() {
        let mut change = FileChange::new("/src/renamed.rs", ChangeKind::Rename);
        change.original_path = Some("/src/orig.rs".into());
        let fetcher = MapFetcher::new(&[
            ("/src/orig.rs", "old-rev", "a\nb"),
            ("/src/renamed.rs", "new-rev", "a\nc"),
        ]);
        let section = resolve_file(&fetcher, &change, &opts()).await;
        assert!(section.header.contains("renamed from /src/orig.rs"));
        assert!(section.body.contains("- b"));
        assert!(section.body.contains("+ c"));
    }

    #[tokio::test]
    async fn identical_content_notes_no_changes() {
        let fetcher = MapFetcher::new(&[
            ("/src/a.rs", "old-rev", "same"),
            ("/src/a.rs", "new-rev", "same"),
        ]);
        let change = FileChange::new("/src/a.rs", ChangeKind::Edit);
        let section = resolve_file(&fetcher, &change, &opts()).await;
        assert_eq!(section.body, "(no line changes)");
    }
}
