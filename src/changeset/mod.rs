//! Change-set assembly: ordering, capping, and batched resolution.
//!
//! Turns a PR's changed-file list into one [`ChangeSetDocument`]. Files
//! with a recognised code extension sort first (stable within groups),
//! only the first `max_files` are fetched, and resolution runs in
//! fixed-width concurrent batches so peak in-flight requests stay
//! bounded. Sections accumulate until the total character budget is
//! reached; whatever remains collapses into a single truncation notice.

pub mod resolver;

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::constants::{
    DEFAULT_BATCH_WIDTH, DEFAULT_CONTEXT_LINES, DEFAULT_COST_CEILING, DEFAULT_MAX_FILES,
    DEFAULT_MAX_FILE_CHARS, DEFAULT_MAX_TOTAL_CHARS, TRUNCATION_NOTICE,
};
use crate::host::{ChangeListProvider, ChangeScope, ContentFetcher, HostError};
use crate::models::diff::{ChangeSetDocument, DiffSection};
use crate::models::FileChange;

use resolver::{resolve_file, ResolveOptions};

/// Options for [`build_change_set`].
#[derive(Debug, Clone)]
pub struct ChangeSetOptions {
    /// Diff lower bound: a previously reviewed iteration id.
    pub from_iteration_id: Option<i64>,
    /// Folder prefixes excluded before capping.
    pub skip_folders: Vec<String>,
    pub max_files: usize,
    pub max_file_chars: usize,
    pub max_total_chars: usize,
    pub batch_width: usize,
    pub context_lines: usize,
    pub cost_ceiling: usize,
}

impl Default for ChangeSetOptions {
    fn default() -> Self {
        Self {
            from_iteration_id: None,
            skip_folders: Vec::new(),
            max_files: DEFAULT_MAX_FILES,
            max_file_chars: DEFAULT_MAX_FILE_CHARS,
            max_total_chars: DEFAULT_MAX_TOTAL_CHARS,
            batch_width: DEFAULT_BATCH_WIDTH,
            context_lines: DEFAULT_CONTEXT_LINES,
            cost_ceiling: DEFAULT_COST_CEILING,
        }
    }
}

/// Assemble the change-set document for one PR revision range.
pub async fn build_change_set(
    provider: &dyn ChangeListProvider,
    fetcher: Arc<dyn ContentFetcher>,
    pr_id: u64,
    opts: &ChangeSetOptions,
) -> Result<ChangeSetDocument, HostError> {
    let revisions = provider
        .revision_range(pr_id, opts.from_iteration_id)
        .await?;

    let scope = match revisions.from_iteration {
        Some(from) => ChangeScope::SinceIteration(from),
        None => ChangeScope::LatestIteration,
    };
    let mut changes = provider.list_changes(pr_id, scope).await?;

    changes.retain(|c| !is_skipped(&c.path, &opts.skip_folders));
    let total_files = changes.len();

    // Code files first; sort_by_key is stable, so original host order is
    // preserved within each group.
    changes.sort_by_key(|c| !is_code_path(&c.path));
    changes.truncate(opts.max_files);
    let shown_files = changes.len();

    let resolve_opts = ResolveOptions {
        revisions: revisions.clone(),
        max_file_chars: opts.max_file_chars,
        context_lines: opts.context_lines,
        cost_ceiling: opts.cost_ceiling,
    };

    let mut sections: Vec<DiffSection> = Vec::with_capacity(shown_files);
    let mut used_chars = 0usize;
    let mut over_budget = false;

    // Fixed-width batches: wait for one batch before issuing the next.
    'batches: for batch in changes.chunks(opts.batch_width.max(1)) {
        let mut join_set = JoinSet::new();
        for (idx, change) in batch.iter().cloned().enumerate() {
            let fetcher = Arc::clone(&fetcher);
            let ropts = resolve_opts.clone();
            join_set
                .spawn(async move { (idx, resolve_file(fetcher.as_ref(), &change, &ropts).await) });
        }

        let mut resolved: Vec<Option<DiffSection>> = vec![None; batch.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, section)) => resolved[idx] = Some(section),
                Err(e) => eprintln!("Warning: file resolution task failed: {e}"),
            }
        }

        for (idx, slot) in resolved.into_iter().enumerate() {
            let section = slot.unwrap_or_else(|| failed_section(&batch[idx]));
            if used_chars + section.char_len() > opts.max_total_chars {
                sections.push(DiffSection {
                    path: String::new(),
                    header: String::new(),
                    body: format!("{TRUNCATION_NOTICE} change-set character budget reached; remaining files omitted"),
                    truncated: true,
                });
                over_budget = true;
                break 'batches;
            }
            used_chars += section.char_len();
            sections.push(section);
        }
    }

    let rendered_files = sections.iter().filter(|s| !s.path.is_empty()).count();
    let mut header_text = format!(
        "Reviewing {rendered_files} of {total_files} changed file{}",
        if total_files == 1 { "" } else { "s" }
    );
    if total_files > rendered_files || over_budget {
        header_text.push_str(&format!(" ({} omitted)", total_files - rendered_files));
    }
    if let Some(from) = revisions.from_iteration {
        header_text.push_str(&format!(
            "\nIterations {from} -> {}",
            revisions.latest_iteration
        ));
    }

    Ok(ChangeSetDocument {
        header_text,
        sections,
        total_files,
        shown_files: rendered_files,
        latest_iteration: revisions.latest_iteration,
    })
}

fn failed_section(change: &FileChange) -> DiffSection {
    DiffSection {
        path: change.path.clone(),
        header: format!("### {} ({})", change.path, change.kind),
        body: "(file resolution failed)".to_string(),
        truncated: false,
    }
}

fn is_skipped(path: &str, skip_folders: &[String]) -> bool {
    let trimmed = path.trim_start_matches('/');
    skip_folders.iter().any(|folder| {
        let folder = folder.trim_matches('/');
        !folder.is_empty()
            && (trimmed == folder || trimmed.starts_with(&format!("{folder}/")))
    })
}

/// Extensions treated as reviewable code, sorted ahead of everything else.
const CODE_EXTENSIONS: &[&str] = &[
    "rs", "ts", "tsx", "js", "jsx", "py", "go", "java", "cs", "cpp", "cc", "c", "h", "hpp", "rb",
    "kt", "swift", "php", "scala", "sql", "sh", "bash", "ps1", "vue", "svelte",
];

fn is_code_path(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| CODE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
