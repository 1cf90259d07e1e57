//! Linear-time approximate matcher for oversized inputs.
//!
//! Walks both sequences in lockstep: on a mismatch it emits one `Del`
//! and one `Add` and advances both cursors. A deliberately lower-quality
//! approximation traded for O(n+m) time; a single inserted line near the
//! top will misalign everything after it. Used only when the input is
//! too large for the exact LCS matcher.

use crate::models::diff::{EditKind, EditOp};

use super::lcs::number_script;

/// Produce a lockstep edit script between two line sequences.
pub fn edit_script(old: &[&str], new: &[&str]) -> Vec<EditOp> {
    let mut kinds = Vec::with_capacity(old.len().max(new.len()));
    let (mut i, mut j) = (0usize, 0usize);

    while i < old.len() && j < new.len() {
        if old[i] == new[j] {
            kinds.push(EditKind::Keep);
        } else {
            kinds.push(EditKind::Del);
            kinds.push(EditKind::Add);
        }
        i += 1;
        j += 1;
    }
    // One side may have a tail left over.
    kinds.extend(std::iter::repeat_n(EditKind::Del, old.len() - i));
    kinds.extend(std::iter::repeat_n(EditKind::Add, new.len() - j));

    number_script(&kinds, old, new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mismatch_emits_del_then_add() {
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
    fn old_tail_is_deleted() {
        let ops = edit_script(&["a", "b", "c"], &["a"]);
        let kinds: Vec<_> = ops.iter().map(|op| op.kind).collect();
        assert_eq!(kinds, vec![EditKind::Keep, EditKind::Del, EditKind::Del]);
    }

    #[test]
    fn new_tail_is_added() {
        let ops = edit_script(&["a"], &["a", "b", "c"]);
        let kinds: Vec<_> = ops.iter().map(|op| op.kind).collect();
        assert_eq!(kinds, vec![EditKind::Keep, EditKind::Add, EditKind::Add]);
    }

    #[test]
    fn round_trip_holds_despite_approximation() {
        // An insertion at the top misaligns every later line, but the
        // replay invariant must still hold.
        let old = vec!["b", "c", "d"];
        let new = vec!["a", "b", "c", "d"];
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
    fn empty_inputs_yield_empty_script() {
        assert!(edit_script(&[], &[]).is_empty());
    }
}
