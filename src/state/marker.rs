//! The machine-readable marker embedded in posted review comments.
//!
//! Format: a fixed opening token, comma-separated commit ids, a fixed
//! closing token; optionally a second token pair wrapping one integer
//! iteration id. Rendered as HTML comments so the marker is invisible
//! in the host's markdown view but round-trips exactly through the
//! comment store.
//!
//! A re-review preserves the previous comment inside a collapsible
//! `<details>` block, so that block is stripped before scanning —
//! otherwise a stale nested marker would shadow the live one.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{
    MARKER_COMMITS_CLOSE, MARKER_COMMITS_OPEN, MARKER_ITERATION_CLOSE, MARKER_ITERATION_OPEN,
};

/// Parsed marker contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPayload {
    pub commit_ids: Vec<String>,
    pub iteration_id: Option<i64>,
}

/// Result of scanning one comment body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerScan {
    /// No marker token present.
    Absent,
    /// The opening token is present but the payload does not parse.
    /// Callers fail open: the comment counts as a prior review that
    /// covered nothing.
    Malformed,
    Found(MarkerPayload),
}

static COMMITS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "{}([^\\]]*){}",
        regex::escape(MARKER_COMMITS_OPEN),
        regex::escape(MARKER_COMMITS_CLOSE),
    ))
    .expect("commits marker regex")
});

static ITERATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "{}([^\\]]*){}",
        regex::escape(MARKER_ITERATION_OPEN),
        regex::escape(MARKER_ITERATION_CLOSE),
    ))
    .expect("iteration marker regex")
});

/// Drop every `<details>` block, counting nesting depth. After two
/// re-reviews the folded prior body itself contains a `<details>`
/// block, so a non-greedy regex would stop at the inner close tag and
/// leak a stale marker back into the scanned text.
fn strip_details(body: &str) -> String {
    const OPEN: &[u8] = b"<details";
    const CLOSE: &[u8] = b"</details>";

    fn token_at(bytes: &[u8], i: usize, token: &[u8]) -> bool {
        bytes.len() >= i + token.len() && bytes[i..i + token.len()].eq_ignore_ascii_case(token)
    }

    let bytes = body.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        if token_at(bytes, i, CLOSE) {
            depth = depth.saturating_sub(1);
            i += CLOSE.len();
        } else if token_at(bytes, i, OPEN) {
            depth += 1;
            i += OPEN.len();
        } else {
            if depth == 0 {
                out.push(bytes[i]);
            }
            i += 1;
        }
    }
    // Stripped regions begin and end at ASCII tag boundaries, so the
    // surviving bytes are still valid UTF-8.
    String::from_utf8_lossy(&out).into_owned()
}

/// Render the marker block for a posted comment.
pub fn render_marker(commit_ids: &[String], iteration_id: Option<i64>) -> String {
    let mut out = format!(
        "{}{}{}",
        MARKER_COMMITS_OPEN,
        commit_ids.join(","),
        MARKER_COMMITS_CLOSE
    );
    if let Some(id) = iteration_id {
        out.push('\n');
        out.push_str(&format!(
            "{MARKER_ITERATION_OPEN}{id}{MARKER_ITERATION_CLOSE}"
        ));
    }
    out
}

/// Scan a comment body for the live marker.
pub fn scan_marker(body: &str) -> MarkerScan {
    let live = strip_details(body);

    if !live.contains(MARKER_COMMITS_OPEN) {
        return MarkerScan::Absent;
    }

    // The live marker is always the last one in the body: re-reviews
    // append a fresh marker after the folded previous comment.
    let Some(commits_cap) = COMMITS_RE.captures_iter(&live).last() else {
        return MarkerScan::Malformed;
    };
    let commit_ids: Vec<String> = commits_cap[1]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    // A present-but-unparseable iteration id is ignored rather than
    // failing the whole marker; absence is valid for older reviews.
    let iteration_id = ITERATION_RE
        .captures_iter(&live)
        .last()
        .and_then(|cap| cap[1].trim().parse::<i64>().ok());

    MarkerScan::Found(MarkerPayload {
        commit_ids,
        iteration_id,
    })
}
