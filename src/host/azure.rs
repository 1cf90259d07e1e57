//! Azure DevOps REST client.
//!
//! Implements the host collaborator traits against the Azure DevOps
//! git API (PR iterations, iteration changes, threads, commits, and
//! item content). Response shapes are explicit serde schemas validated
//! at the boundary; optional fields get named defaults instead of
//! duck-typed lookups.
//!
//! The `reqwest::Client` is constructed once by the caller (with the
//! per-call timeout) and passed in, so connection pooling is shared and
//! nothing reads ambient global state.

use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;

use crate::models::{ChangeKind, FileChange};

use super::{
    ChangeListProvider, ChangeScope, CommentStore, CommitLister, ContentFetcher, HostError,
    PrComment, RevisionPair,
};

const API_VERSION: &str = "7.1";

/// Connection to one Azure DevOps repository.
pub struct AzureClient {
    http: reqwest::Client,
    /// `{org_url}/{project}/_apis/git/repositories/{repo}`
    base: String,
    auth_header: String,
}

impl AzureClient {
    pub fn new(
        http: reqwest::Client,
        org_url: &str,
        project: &str,
        repository: &str,
        token: &str,
    ) -> Self {
        let base = format!(
            "{}/{}/_apis/git/repositories/{}",
            org_url.trim_end_matches('/'),
            project,
            repository,
        );
        // PATs use Basic auth with an empty username.
        let encoded = base64::engine::general_purpose::STANDARD.encode(format!(":{token}"));
        Self {
            http,
            base,
            auth_header: format!("Basic {encoded}"),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, HostError> {
        let response = self
            .http
            .get(url)
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|e| HostError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HostError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| HostError::Decode(e.to_string()))
    }

    async fn iterations(&self, pr_id: u64) -> Result<Vec<Iteration>, HostError> {
        let url = format!(
            "{}/pullRequests/{pr_id}/iterations?api-version={API_VERSION}",
            self.base
        );
        let list: ValueList<Iteration> = self.get_json(&url).await?;
        Ok(list.value)
    }

    async fn latest_iteration(&self, pr_id: u64) -> Result<Iteration, HostError> {
        self.iterations(pr_id)
            .await?
            .into_iter()
            .max_by_key(|it| it.id)
            .ok_or_else(|| HostError::Decode("PR has no iterations".to_string()))
    }
}

// ── Wire schemas ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ValueList<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Iteration {
    id: i64,
    source_ref_commit: Option<CommitRef>,
    common_ref_commit: Option<CommitRef>,
    target_ref_commit: Option<CommitRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitRef {
    commit_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IterationChanges {
    #[serde(default = "Vec::new")]
    change_entries: Vec<ChangeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitChanges {
    #[serde(default = "Vec::new")]
    changes: Vec<ChangeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeEntry {
    #[serde(default)]
    change_type: String,
    item: Option<ChangeItem>,
    /// Pre-rename path, present on rename entries.
    source_server_item: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeItem {
    #[serde(default)]
    path: String,
    #[serde(default)]
    is_folder: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrCommit {
    commit_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Thread {
    id: i64,
    #[serde(default = "Vec::new")]
    comments: Vec<ThreadComment>,
    #[serde(default)]
    is_deleted: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadComment {
    id: i64,
    #[serde(default)]
    content: String,
    #[serde(default)]
    published_date: String,
    #[serde(default)]
    is_deleted: bool,
}

/// Map an Azure `changeType` string onto a [`ChangeKind`].
///
/// Azure composes types ("rename, edit"); rename wins so the resolver
/// still fetches both sides.
fn parse_change_kind(change_type: &str) -> Option<ChangeKind> {
    let lowered = change_type.to_lowercase();
    if lowered.contains("rename") {
        Some(ChangeKind::Rename)
    } else if lowered.contains("delete") {
        Some(ChangeKind::Delete)
    } else if lowered.contains("add") {
        Some(ChangeKind::Add)
    } else if lowered.contains("edit") {
        Some(ChangeKind::Edit)
    } else {
        None
    }
}

fn entries_to_changes(entries: Vec<ChangeEntry>) -> Vec<FileChange> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let item = entry.item?;
            if item.is_folder || item.path.is_empty() {
                return None;
            }
            let kind = parse_change_kind(&entry.change_type)?;
            Some(FileChange {
                path: item.path,
                kind,
                original_path: entry.source_server_item,
            })
        })
        .collect()
}

// ── Trait implementations ───────────────────────────────────────────

#[async_trait]
impl ContentFetcher for AzureClient {
    async fn fetch(&self, path: &str, revision: &str) -> Result<Option<String>, HostError> {
        let url = format!(
            "{}/items?path={}&versionDescriptor.version={revision}\
             &versionDescriptor.versionType=commit&includeContent=true\
             &$format=text&api-version={API_VERSION}",
            self.base,
            urlencode(path),
        );
        let response = self
            .http
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "text/plain")
            .send()
            .await
            .map_err(|e| HostError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(HostError::Status {
                status: status.as_u16(),
                url,
            });
        }
        let text = response
            .text()
            .await
            .map_err(|e| HostError::Transport(e.to_string()))?;
        Ok(Some(text))
    }
}

#[async_trait]
impl ChangeListProvider for AzureClient {
    async fn list_changes(
        &self,
        pr_id: u64,
        scope: ChangeScope,
    ) -> Result<Vec<FileChange>, HostError> {
        match scope {
            ChangeScope::Commit(commit_id) => {
                let url = format!(
                    "{}/commits/{commit_id}/changes?api-version={API_VERSION}",
                    self.base
                );
                let changes: CommitChanges = self.get_json(&url).await?;
                Ok(entries_to_changes(changes.changes))
            }
            ChangeScope::LatestIteration | ChangeScope::SinceIteration(_) => {
                let latest = self.latest_iteration(pr_id).await?;
                let mut url = format!(
                    "{}/pullRequests/{pr_id}/iterations/{}/changes?api-version={API_VERSION}",
                    self.base, latest.id
                );
                if let ChangeScope::SinceIteration(from) = scope {
                    url.push_str(&format!("&$compareTo={from}"));
                }
                let changes: IterationChanges = self.get_json(&url).await?;
                Ok(entries_to_changes(changes.change_entries))
            }
        }
    }

    async fn revision_range(
        &self,
        pr_id: u64,
        from_iteration: Option<i64>,
    ) -> Result<RevisionPair, HostError> {
        let iterations = self.iterations(pr_id).await?;
        let latest = iterations
            .iter()
            .max_by_key(|it| it.id)
            .ok_or_else(|| HostError::Decode("PR has no iterations".to_string()))?;

        let new = latest
            .source_ref_commit
            .as_ref()
            .map(|c| c.commit_id.clone())
            .ok_or_else(|| HostError::Decode("iteration has no source commit".to_string()))?;

        // Old side: the reviewed iteration's source commit when diffing
        // incrementally, the PR's merge base otherwise.
        let (old, resolved_from) = match from_iteration
            .and_then(|from| iterations.iter().find(|it| it.id == from))
        {
            Some(from_it) => {
                let commit = from_it
                    .source_ref_commit
                    .as_ref()
                    .map(|c| c.commit_id.clone())
                    .ok_or_else(|| {
                        HostError::Decode("iteration has no source commit".to_string())
                    })?;
                (commit, Some(from_it.id))
            }
            None => {
                let commit = latest
                    .common_ref_commit
                    .as_ref()
                    .or(latest.target_ref_commit.as_ref())
                    .map(|c| c.commit_id.clone())
                    .ok_or_else(|| HostError::Decode("iteration has no base commit".to_string()))?;
                (commit, None)
            }
        };

        Ok(RevisionPair {
            old,
            new,
            from_iteration: resolved_from,
            latest_iteration: latest.id,
        })
    }
}

#[async_trait]
impl CommentStore for AzureClient {
    async fn list_comments(&self, pr_id: u64) -> Result<Vec<PrComment>, HostError> {
        let url = format!(
            "{}/pullRequests/{pr_id}/threads?api-version={API_VERSION}",
            self.base
        );
        let threads: ValueList<Thread> = self.get_json(&url).await?;

        let mut comments: Vec<PrComment> = threads
            .value
            .into_iter()
            .filter(|t| !t.is_deleted)
            .flat_map(|t| {
                let thread_id = t.id;
                t.comments
                    .into_iter()
                    .filter(|c| !c.is_deleted)
                    .map(move |c| PrComment {
                        id: c.id,
                        thread_id,
                        body: c.content,
                        posted_at: c.published_date,
                    })
            })
            .collect();
        comments.sort_by(|a, b| a.posted_at.cmp(&b.posted_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn post_comment(&self, pr_id: u64, body: &str) -> Result<PrComment, HostError> {
        let url = format!(
            "{}/pullRequests/{pr_id}/threads?api-version={API_VERSION}",
            self.base
        );
        let payload = serde_json::json!({
            "comments": [{ "parentCommentId": 0, "content": body, "commentType": 1 }],
            "status": 1,
        });
        let response = self
            .http
            .post(&url)
            .header("Authorization", &self.auth_header)
            .json(&payload)
            .send()
            .await
            .map_err(|e| HostError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HostError::Status {
                status: status.as_u16(),
                url,
            });
        }
        let thread: Thread = response
            .json()
            .await
            .map_err(|e| HostError::Decode(e.to_string()))?;
        let comment = thread
            .comments
            .first()
            .ok_or_else(|| HostError::Decode("created thread has no comments".to_string()))?;
        Ok(PrComment {
            id: comment.id,
            thread_id: thread.id,
            body: comment.content.clone(),
            posted_at: comment.published_date.clone(),
        })
    }

    async fn update_comment(
        &self,
        pr_id: u64,
        thread_id: i64,
        comment_id: i64,
        body: &str,
    ) -> Result<(), HostError> {
        let url = format!(
            "{}/pullRequests/{pr_id}/threads/{thread_id}/comments/{comment_id}?api-version={API_VERSION}",
            self.base
        );
        let response = self
            .http
            .patch(&url)
            .header("Authorization", &self.auth_header)
            .json(&serde_json::json!({ "content": body }))
            .send()
            .await
            .map_err(|e| HostError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HostError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CommitLister for AzureClient {
    async fn list_commits(&self, pr_id: u64) -> Result<Vec<String>, HostError> {
        let url = format!(
            "{}/pullRequests/{pr_id}/commits?api-version={API_VERSION}",
            self.base
        );
        let list: ValueList<PrCommit> = self.get_json(&url).await?;
        // Azure returns newest first; the engine wants oldest first.
        Ok(list
            .value
            .into_iter()
            .rev()
            .map(|c| c.commit_id)
            .collect())
    }
}

/// Percent-encode the characters that matter in a repo path query value.
fn urlencode(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for b in path.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(b as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}
