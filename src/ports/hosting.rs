//! Code-hosting port for pull requests and reviews.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::RemoteIdentity;
use crate::error::Result;

/// Boxed future type alias used by [`CodeHost`] to keep the trait dyn-compatible.
pub type HostFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Open/closed state of a pull request. Merged pull requests are closed
/// with a `merged_at` timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    /// Still open for review.
    Open,
    /// Closed, merged or not.
    Closed,
}

/// A branch reference on either side of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Branch name.
    #[serde(rename = "ref")]
    pub name: String,
    /// Commit the branch pointed at.
    #[serde(default)]
    pub sha: String,
}

/// A pull request as returned by the hosting API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Repository-scoped pull request number.
    pub number: u64,
    /// Browser URL.
    pub html_url: String,
    /// Title.
    pub title: String,
    /// Description, absent when empty.
    #[serde(default)]
    pub body: Option<String>,
    /// Open/closed state.
    pub state: PullRequestState,
    /// When the pull request was merged, if it was.
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    /// Source branch.
    pub head: PullRequestRef,
    /// Target branch.
    pub base: PullRequestRef,
}

impl PullRequest {
    /// Whether the pull request has been merged.
    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }

    /// Whether the pull request is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == PullRequestState::Open
    }
}

/// Fields needed to open a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    /// Title (first line of the propagated message).
    pub title: String,
    /// Body (remaining lines of the propagated message).
    pub body: String,
    /// Source branch.
    pub head: String,
    /// Target branch.
    pub base: String,
}

/// Verdict of a single review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    /// The reviewer approved.
    Approved,
    /// The reviewer requested changes.
    ChangesRequested,
    /// Comments, dismissals and pending reviews.
    #[serde(other)]
    Other,
}

/// A pull request review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Verdict.
    pub state: ReviewState,
    /// Submission time; pending reviews have none.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Pull request operations against a code-hosting service.
///
/// Calls are asynchronous but callers await each one before issuing the
/// next, so output ordering stays deterministic.
pub trait CodeHost: Send + Sync {
    /// Lists pull requests in any state targeting `base`, optionally
    /// restricted to those whose head is `head`.
    fn list_pull_requests<'a>(
        &'a self,
        repo: &'a RemoteIdentity,
        head: Option<&'a str>,
        base: &'a str,
    ) -> HostFuture<'a, Vec<PullRequest>>;

    /// Opens a new pull request.
    fn create_pull_request<'a>(
        &'a self,
        repo: &'a RemoteIdentity,
        request: &'a NewPullRequest,
    ) -> HostFuture<'a, PullRequest>;

    /// Closes a pull request without merging it.
    fn close_pull_request<'a>(
        &'a self,
        repo: &'a RemoteIdentity,
        number: u64,
    ) -> HostFuture<'a, PullRequest>;

    /// Lists the reviews submitted on a pull request.
    fn list_reviews<'a>(
        &'a self,
        repo: &'a RemoteIdentity,
        number: u64,
    ) -> HostFuture<'a, Vec<Review>>;
}
