//! Diff engine: line matchers and hunk rendering.
//!
//! Pure, synchronous, side-effect-free. The public entry point is
//! [`diff_lines`], which picks a matcher based on input size, and
//! [`render::render`], which turns the resulting edit script into
//! unified-diff text.

pub mod fallback;
pub mod lcs;
pub mod render;

use crate::constants::DEFAULT_COST_CEILING;
use crate::models::diff::EditOp;

/// Compute a line-level edit script between two whole-file texts.
///
/// Uses the exact LCS matcher when `lines(old) × lines(new)` is within
/// `cost_ceiling`, otherwise the linear lockstep approximation.
pub fn diff_lines(old_text: &str, new_text: &str, cost_ceiling: usize) -> Vec<EditOp> {
    let old: Vec<&str> = old_text.lines().collect();
    let new: Vec<&str> = new_text.lines().collect();

    if old.len().saturating_mul(new.len()) <= cost_ceiling {
        lcs::edit_script(&old, &new)
    } else {
        fallback::edit_script(&old, &new)
    }
}

/// [`diff_lines`] with the default cost ceiling.
pub fn diff_lines_default(old_text: &str, new_text: &str) -> Vec<EditOp> {
    diff_lines(old_text, new_text, DEFAULT_COST_CEILING)
}
