//! Revision-control host collaborators.
//!
//! Four narrow traits cover everything the engine needs from a PR host:
//! file content at a revision, changed-file lists, comment threads, and
//! commit lists. The engine only ever talks to these traits; the
//! concrete [`azure::AzureClient`] implements them against the Azure
//! DevOps REST API, and tests implement them in memory.

pub mod azure;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::FileChange;

/// Errors from host API calls.
///
/// All of these are recovered locally by degrading the affected unit —
/// one file section, or treating the PR as having no prior review —
/// rather than aborting the run.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("host request failed: {0}")]
    Transport(String),

    #[error("host returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("unexpected host response shape: {0}")]
    Decode(String),
}

/// Which slice of a PR's changes to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeScope {
    /// Everything in the PR's latest iteration.
    LatestIteration,
    /// Changes introduced after the given iteration.
    SinceIteration(i64),
    /// Changes of one individual commit.
    Commit(String),
}

/// The concrete revisions to diff a change-set against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionPair {
    /// Revision holding the old file contents.
    pub old: String,
    /// Revision holding the new file contents.
    pub new: String,
    /// Iteration the old revision corresponds to, when known.
    pub from_iteration: Option<i64>,
    /// The PR's latest iteration id.
    pub latest_iteration: i64,
}

/// One comment on a PR, in posting order.
#[derive(Debug, Clone)]
pub struct PrComment {
    pub id: i64,
    pub thread_id: i64,
    pub body: String,
    /// Host-supplied publish timestamp, ISO-8601. Lexicographic order
    /// matches chronological order for this format.
    pub posted_at: String,
}

/// Fetches whole-file content at a specific revision.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Returns `Ok(None)` when the file does not exist at `revision`.
    async fn fetch(&self, path: &str, revision: &str) -> Result<Option<String>, HostError>;
}

/// Lists a PR's changed files and resolves its iteration bounds.
#[async_trait]
pub trait ChangeListProvider: Send + Sync {
    async fn list_changes(
        &self,
        pr_id: u64,
        scope: ChangeScope,
    ) -> Result<Vec<FileChange>, HostError>;

    /// Resolve the old/new revisions for a diff, optionally lower-bounded
    /// by a previously reviewed iteration.
    async fn revision_range(
        &self,
        pr_id: u64,
        from_iteration: Option<i64>,
    ) -> Result<RevisionPair, HostError>;
}

/// Reads and writes the PR comment threads that persist review state.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn list_comments(&self, pr_id: u64) -> Result<Vec<PrComment>, HostError>;

    /// Post `body` as a new thread; returns the created comment.
    async fn post_comment(&self, pr_id: u64, body: &str) -> Result<PrComment, HostError>;

    async fn update_comment(
        &self,
        pr_id: u64,
        thread_id: i64,
        comment_id: i64,
        body: &str,
    ) -> Result<(), HostError>;
}

/// Lists a PR's commit ids, oldest first.
#[async_trait]
pub trait CommitLister: Send + Sync {
    async fn list_commits(&self, pr_id: u64) -> Result<Vec<String>, HostError>;
}

/// Everything the review pipeline needs from one host connection.
pub trait PrHost: ContentFetcher + ChangeListProvider + CommentStore + CommitLister {}

impl<T: ContentFetcher + ChangeListProvider + CommentStore + CommitLister> PrHost for T {}
