//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! marker tokens, and default budgets so a rename or retune only requires
//! changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "recheck";

/// Crate version, surfaced by `--version` and the `version` subcommand.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local config filename (e.g. `.recheck.toml` in repo root).
pub const CONFIG_FILENAME: &str = ".recheck.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "recheck";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_PROVIDER: &str = "RECHECK_PROVIDER";
pub const ENV_MODEL: &str = "RECHECK_MODEL";
pub const ENV_API_KEY: &str = "RECHECK_API_KEY";
pub const ENV_BASE_URL: &str = "RECHECK_BASE_URL";
pub const ENV_HOST_TOKEN: &str = "RECHECK_TOKEN";
pub const ENV_HOST_TOKEN_FALLBACK: &str = "AZURE_DEVOPS_PAT";
pub const ENV_ORG_URL: &str = "RECHECK_ORG_URL";
pub const ENV_PROJECT: &str = "RECHECK_PROJECT";
pub const ENV_REPOSITORY: &str = "RECHECK_REPO";

// ── Marker tokens ───────────────────────────────────────────────────
//
// Embedded in posted review comments as HTML comments so they are
// invisible in rendered markdown but survive verbatim in the comment
// body. The payload between open and close must round-trip exactly.

pub const MARKER_COMMITS_OPEN: &str = "<!--recheck:commits[";
pub const MARKER_COMMITS_CLOSE: &str = "]-->";
pub const MARKER_ITERATION_OPEN: &str = "<!--recheck:iteration[";
pub const MARKER_ITERATION_CLOSE: &str = "]-->";

// ── Default budgets and limits ──────────────────────────────────────

/// Max `n × m` product for the exact LCS matcher; larger inputs use the
/// linear fallback matcher.
pub const DEFAULT_COST_CEILING: usize = 300_000;

/// Unchanged context lines on each side of a changed run.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// Max files rendered into one change-set document.
pub const DEFAULT_MAX_FILES: usize = 40;

/// Character budget per file section.
pub const DEFAULT_MAX_FILE_CHARS: usize = 8_000;

/// Character budget for the whole change-set document.
pub const DEFAULT_MAX_TOTAL_CHARS: usize = 120_000;

/// Width of a concurrent file-fetch batch.
pub const DEFAULT_BATCH_WIDTH: usize = 6;

/// Per-call timeout for host API requests, in seconds.
pub const HOST_TIMEOUT_SECS: u64 = 15;

/// Appended when a section or document hits its character budget.
pub const TRUNCATION_NOTICE: &str = "... (truncated)";
