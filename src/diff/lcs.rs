//! Exact line matcher based on Longest Common Subsequence.
//!
//! Builds the full `(n+1) × (m+1)` LCS-length table and walks it back
//! from `(n, m)`. Quadratic in time and memory, so callers guard with
//! the cost ceiling in [`super::diff_lines`] and fall back to the
//! linear matcher for oversized inputs.

use crate::models::diff::{EditKind, EditOp};

/// Produce an LCS-optimal edit script between two line sequences.
///
/// The script has the minimal possible number of `Add` + `Del` ops.
/// Within a replaced run, deletions are emitted before insertions.
/// Deterministic for fixed inputs; empty inputs yield an empty script.
pub fn edit_script(old: &[&str], new: &[&str]) -> Vec<EditOp> {
    let n = old.len();
    let m = new.len();

    // table[i][j] = LCS length of old[..i] and new[..j]
    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            table[i][j] = if old[i - 1] == new[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i][j - 1].max(table[i - 1][j])
            };
        }
    }

    // Walk back from (n, m). On a tie between staying in the same row
    // (an insertion) and moving up a row (a deletion), take the
    // insertion; after reversal that places deletions first in the
    // forward script.
    let mut kinds = Vec::with_capacity(n + m);
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && old[i - 1] == new[j - 1] {
            kinds.push(EditKind::Keep);
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table[i][j - 1] >= table[i - 1][j]) {
            kinds.push(EditKind::Add);
            j -= 1;
        } else {
            kinds.push(EditKind::Del);
            i -= 1;
        }
    }
    kinds.reverse();

    number_script(&kinds, old, new)
}

/// Attach texts and 1-based line numbers to a forward kind sequence.
pub(super) fn number_script(kinds: &[EditKind], old: &[&str], new: &[&str]) -> Vec<EditOp> {
    let mut ops = Vec::with_capacity(kinds.len());
    let (mut oi, mut ni) = (0usize, 0usize);
    for kind in kinds {
        match kind {
            EditKind::Keep => {
                ops.push(EditOp::keep(old[oi], oi as u32 + 1, ni as u32 + 1));
                oi += 1;
                ni += 1;
            }
            EditKind::Del => {
                ops.push(EditOp::del(old[oi], oi as u32 + 1));
                oi += 1;
            }
            EditKind::Add => {
                ops.push(EditOp::add(new[ni], ni as u32 + 1));
                ni += 1;
            }
        }
    }
    ops
}

/// LCS length alone, without the edit script.
#[cfg(test)]
pub fn lcs_length(old: &[&str], new: &[&str]) -> u32 {
    let m = new.len();
    let mut prev = vec![0u32; m + 1];
    let mut cur = vec![0u32; m + 1];
    for a in old {
        for (j, b) in new.iter().enumerate() {
            cur[j + 1] = if a == b {
                prev[j] + 1
            } else {
                cur[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[m]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(ops: &[EditOp]) -> Vec<EditKind> {
        ops.iter().map(|op| op.kind).collect()
    }

    #[test]
    fn replace_middle_line() {
        let ops = edit_script(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(
            ops,
            vec![
                EditOp::keep("a", 1, 1),
                EditOp::del("b", 2),
                EditOp::add("x", 2),
                EditOp::keep("c", 3, 3),
            ]
        );
    }

    #[test]
    fn empty_inputs_yield_empty_script() {
        assert!(edit_script(&[], &[]).is_empty());
    }

    #[test]
    fn all_additions_from_empty_old() {
        let ops = edit_script(&[], &["x", "y"]);
        assert_eq!(kinds(&ops), vec![EditKind::Add, EditKind::Add]);
        assert_eq!(ops[1].new_line_no, Some(2));
    }

    #[test]
    fn all_deletions_from_empty_new() {
        let ops = edit_script(&["x", "y"], &[]);
        assert_eq!(kinds(&ops), vec![EditKind::Del, EditKind::Del]);
        assert_eq!(ops[1].old_line_no, Some(2));
    }

    #[test]
    fn identical_inputs_are_all_keeps() {
        let ops = edit_script(&["a", "b"], &["a", "b"]);
        assert_eq!(kinds(&ops), vec![EditKind::Keep, EditKind::Keep]);
    }

    #[test]
    fn script_is_lcs_optimal() {
        let old = vec!["a", "b", "c", "d", "e", "f"];
        let new = vec!["b", "c", "x", "e", "f", "g"];
        let ops = edit_script(&old, &new);
        let changed = ops.iter().filter(|op| op.kind != EditKind::Keep).count();
        let expected =
            old.len() + new.len() - 2 * lcs_length(&old, &new) as usize;
        assert_eq!(changed, expected);
    }

    #[test]
    fn round_trip_reconstructs_both_sides() {
        let old = vec!["fn main() {", "    old();", "}", "", "mod t;"];
        let new = vec!["fn main() {", "    new();", "    extra();", "}"];
        let ops = edit_script(&old, &new);

        let rebuilt_old: Vec<&str> = ops
            .iter()
            .filter(|op| op.kind != EditKind::Add)
            .map(|op| op.text.as_str())
            .collect();
        let rebuilt_new: Vec<&str> = ops
            .iter()
            .filter(|op| op.kind != EditKind::Del)
            .map(|op| op.text.as_str())
            .collect();

        assert_eq!(rebuilt_old, old);
        assert_eq!(rebuilt_new, new);
    }

    #[test]
    fn deterministic_for_fixed_inputs() {
        let old = vec!["a", "c", "b", "c"];
        let new = vec!["c", "a", "b"];
        assert_eq!(edit_script(&old, &new), edit_script(&old, &new));
    }

    #[test]
    fn repeated_lines_stay_optimal() {
        let old = vec!["x", "x", "x"];
        let new = vec!["x", "x"];
        let ops = edit_script(&old, &new);
        let changed = ops.iter().filter(|op| op.kind != EditKind::Keep).count();
        assert_eq!(changed, 1);
    }
}
