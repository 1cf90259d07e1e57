//! Hunk construction and unified-diff text rendering.
//!
//! Turns an edit script into context-windowed hunks and their textual
//! form, stopping once a character budget is reached. Rendering is
//! deterministic, so a larger budget always yields a superset (prefix)
//! of a smaller one.

use crate::constants::TRUNCATION_NOTICE;
use crate::models::diff::{EditKind, EditOp, Hunk};

/// A rendered edit script.
#[derive(Debug, Clone)]
pub struct RenderedDiff {
    /// Unified-diff style text, possibly truncated.
    pub text: String,
    /// All hunks, regardless of truncation.
    pub hunks: Vec<Hunk>,
    /// Whether `text` hit the character budget.
    pub truncated: bool,
}

impl RenderedDiff {
    fn empty() -> Self {
        Self {
            text: String::new(),
            hunks: Vec::new(),
            truncated: false,
        }
    }
}

/// Build hunks from an edit script and render them under a budget.
///
/// Every non-`Keep` op is a change anchor; each anchor expands by
/// `context` ops both ways, and overlapping or adjacent windows merge
/// into one hunk. A script with no non-`Keep` op renders nothing.
pub fn render(ops: &[EditOp], context: usize, max_chars: usize) -> RenderedDiff {
    let windows = merged_windows(ops, context);
    if windows.is_empty() {
        return RenderedDiff::empty();
    }

    // Old/new line counts consumed before each op, for hunk starts in
    // windows that open on an insertion.
    let mut consumed = Vec::with_capacity(ops.len());
    let (mut old_before, mut new_before) = (0u32, 0u32);
    for op in ops {
        consumed.push((old_before, new_before));
        if op.old_line_no.is_some() {
            old_before += 1;
        }
        if op.new_line_no.is_some() {
            new_before += 1;
        }
    }

    let hunks: Vec<Hunk> = windows
        .iter()
        .map(|&(lo, hi)| {
            let slice = &ops[lo..=hi];
            // A window with no ops on one side anchors at the line
            // preceding the change on that side, unified-diff style,
            // so 0 means an insertion before the first line.
            let start_old = slice
                .iter()
                .find_map(|op| op.old_line_no)
                .unwrap_or(consumed[lo].0);
            let start_new = slice
                .iter()
                .find_map(|op| op.new_line_no)
                .unwrap_or(consumed[lo].1);
            Hunk {
                start_old,
                start_new,
                ops: slice.to_vec(),
            }
        })
        .collect();

    let mut text = String::new();
    let mut truncated = false;
    'render: for hunk in &hunks {
        let header = format!("@@ -{} +{} @@\n", hunk.start_old, hunk.start_new);
        if text.len() + header.len() > max_chars {
            truncated = true;
            break;
        }
        text.push_str(&header);
        for op in &hunk.ops {
            let prefix = match op.kind {
                EditKind::Keep => "  ",
                EditKind::Add => "+ ",
                EditKind::Del => "- ",
            };
            let line_len = prefix.len() + op.text.len() + 1;
            if text.len() + line_len > max_chars {
                truncated = true;
                break 'render;
            }
            text.push_str(prefix);
            text.push_str(&op.text);
            text.push('\n');
        }
    }
    if truncated {
        text.push_str(TRUNCATION_NOTICE);
        text.push('\n');
    }

    RenderedDiff {
        text,
        hunks,
        truncated,
    }
}

/// Expand each change anchor by `context` ops both ways and merge
/// overlapping or adjacent windows, preserving original order.
fn merged_windows(ops: &[EditOp], context: usize) -> Vec<(usize, usize)> {
    let mut windows: Vec<(usize, usize)> = Vec::new();
    for (i, op) in ops.iter().enumerate() {
        if op.kind == EditKind::Keep {
            continue;
        }
        let lo = i.saturating_sub(context);
        let hi = (i + context).min(ops.len() - 1);
        match windows.last_mut() {
            Some(last) if lo <= last.1 + 1 => last.1 = hi,
            _ => windows.push((lo, hi)),
        }
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn script(spec: &[(EditKind, &str)]) -> Vec<EditOp> {
        let (mut old, mut new) = (0u32, 0u32);
        spec.iter()
            .map(|(kind, text)| match kind {
                EditKind::Keep => {
                    old += 1;
                    new += 1;
                    EditOp::keep(*text, old, new)
                }
                EditKind::Del => {
                    old += 1;
                    EditOp::del(*text, old)
                }
                EditKind::Add => {
                    new += 1;
                    EditOp::add(*text, new)
                }
            })
            .collect()
    }

    #[test]
    fn replacement_renders_del_then_add_with_context() {
        let ops = script(&[
            (EditKind::Keep, "a"),
            (EditKind::Del, "b"),
            (EditKind::Add, "x"),
            (EditKind::Keep, "c"),
        ]);
        let rendered = render(&ops, 3, usize::MAX);
        assert_eq!(rendered.text, "@@ -1 +1 @@\n  a\n- b\n+ x\n  c\n");
        assert_eq!(rendered.hunks.len(), 1);
        assert!(!rendered.truncated);
    }

    #[test]
    fn all_keep_script_renders_nothing() {
        let ops = script(&[(EditKind::Keep, "a"), (EditKind::Keep, "b")]);
        let rendered = render(&ops, 3, usize::MAX);
        assert!(rendered.text.is_empty());
        assert!(rendered.hunks.is_empty());
        assert!(!rendered.truncated);
    }

    #[test]
    fn distant_changes_become_separate_hunks() {
        let mut spec = vec![(EditKind::Del, "first")];
        for _ in 0..10 {
            spec.push((EditKind::Keep, "ctx"));
        }
        spec.push((EditKind::Add, "last"));
        let ops = script(&spec);

        let rendered = render(&ops, 3, usize::MAX);
        assert_eq!(rendered.hunks.len(), 2);
        assert_eq!(rendered.hunks[0].start_old, 1);
        // Second hunk opens three context lines before the insertion.
        assert_eq!(rendered.hunks[1].ops.len(), 4);
    }

    #[test]
    fn nearby_changes_merge_into_one_hunk() {
        // Two changed runs separated by 4 keeps: windows of context 3
        // overlap, so they merge.
        let ops = script(&[
            (EditKind::Del, "a"),
            (EditKind::Keep, "1"),
            (EditKind::Keep, "2"),
            (EditKind::Keep, "3"),
            (EditKind::Keep, "4"),
            (EditKind::Add, "b"),
        ]);
        let rendered = render(&ops, 3, usize::MAX);
        assert_eq!(rendered.hunks.len(), 1);
        assert_eq!(rendered.hunks[0].ops.len(), 6);
    }

    #[test]
    fn context_clamped_at_script_edges() {
        let ops = script(&[(EditKind::Add, "only")]);
        let rendered = render(&ops, 3, usize::MAX);
        assert_eq!(rendered.hunks.len(), 1);
        // Insertion before the first old line anchors at 0.
        assert_eq!(rendered.hunks[0].start_old, 0);
        assert_eq!(rendered.hunks[0].start_new, 1);
    }

    #[test]
    fn eof_insertion_anchors_at_last_old_line() {
        let ops = script(&[
            (EditKind::Keep, "a"),
            (EditKind::Keep, "b"),
            (EditKind::Add, "tail"),
        ]);
        // Zero context keeps the window to the insertion alone, so the
        // old side has nothing to number.
        let rendered = render(&ops, 0, usize::MAX);
        assert_eq!(rendered.hunks.len(), 1);
        assert_eq!(rendered.hunks[0].start_old, 2);
        assert_eq!(rendered.hunks[0].start_new, 3);
    }

    #[test]
    fn truncation_appends_notice_and_sets_flag() {
        let spec: Vec<_> = (0..50).map(|_| (EditKind::Add, "added line")).collect();
        let ops = script(&spec);
        let rendered = render(&ops, 3, 100);
        assert!(rendered.truncated);
        assert!(rendered.text.ends_with(&format!("{TRUNCATION_NOTICE}\n")));
        // Hunks are still complete; only the text is cut.
        assert_eq!(rendered.hunks[0].ops.len(), 50);
    }

    #[test]
    fn rendering_is_idempotent() {
        let ops = script(&[
            (EditKind::Keep, "a"),
            (EditKind::Del, "b"),
            (EditKind::Add, "x"),
        ]);
        let first = render(&ops, 3, 40);
        let second = render(&ops, 3, 40);
        assert_eq!(first.text, second.text);
        assert_eq!(first.truncated, second.truncated);
    }

    #[test]
    fn larger_budget_extends_smaller_output() {
        let spec: Vec<_> = (0..40).map(|_| (EditKind::Add, "some added content")).collect();
        let ops = script(&spec);
        let small = render(&ops, 3, 120);
        let large = render(&ops, 3, 400);

        let small_body = small.text.trim_end_matches(&format!("{TRUNCATION_NOTICE}\n"));
        assert!(
            large.text.starts_with(small_body),
            "smaller-budget output must be a prefix of the larger one"
        );
    }
}
