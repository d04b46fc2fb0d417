//! In-memory `CodeHost` holding pull requests and reviews.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::context::RemoteIdentity;
use crate::error::{Error, Result};
use crate::ports::hosting::{
    CodeHost, HostFuture, NewPullRequest, PullRequest, PullRequestRef, PullRequestState, Review,
};

#[derive(Debug, Default)]
struct HostState {
    pull_requests: Vec<PullRequest>,
    reviews: HashMap<u64, Vec<Review>>,
    created: Vec<NewPullRequest>,
    closed: Vec<u64>,
}

/// A code host that keeps pull requests in memory.
#[derive(Debug, Default)]
pub struct MemoryCodeHost {
    state: Mutex<HostState>,
}

/// Builds a pull request from `head` into `base` in the given state.
#[must_use]
pub fn pull_request(
    number: u64,
    head: &str,
    base: &str,
    state: PullRequestState,
    merged_at: Option<DateTime<Utc>>,
) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/acme/widgets/pull/{number}"),
        title: format!("Pull request #{number}"),
        body: None,
        state,
        merged_at,
        head: PullRequestRef {
            name: head.to_string(),
            sha: String::new(),
        },
        base: PullRequestRef {
            name: base.to_string(),
            sha: String::new(),
        },
    }
}

impl MemoryCodeHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().expect("memory host lock poisoned")
    }

    /// Seeds an existing pull request.
    #[must_use]
    pub fn with_pull_request(self, pull_request: PullRequest) -> Self {
        self.lock().pull_requests.push(pull_request);
        self
    }

    /// Seeds the reviews of pull request `number`.
    #[must_use]
    pub fn with_reviews(self, number: u64, reviews: Vec<Review>) -> Self {
        self.lock().reviews.insert(number, reviews);
        self
    }

    /// All pull requests currently known, in creation order.
    #[must_use]
    pub fn pull_requests(&self) -> Vec<PullRequest> {
        self.lock().pull_requests.clone()
    }

    /// Requests received through [`CodeHost::create_pull_request`].
    #[must_use]
    pub fn created(&self) -> Vec<NewPullRequest> {
        self.lock().created.clone()
    }

    /// Numbers passed to [`CodeHost::close_pull_request`].
    #[must_use]
    pub fn closed(&self) -> Vec<u64> {
        self.lock().closed.clone()
    }
}

impl CodeHost for MemoryCodeHost {
    fn list_pull_requests<'a>(
        &'a self,
        _repo: &'a RemoteIdentity,
        head: Option<&'a str>,
        base: &'a str,
    ) -> HostFuture<'a, Vec<PullRequest>> {
        let matching: Vec<PullRequest> = self
            .lock()
            .pull_requests
            .iter()
            .filter(|pr| pr.base.name == base && head.map_or(true, |h| pr.head.name == h))
            .cloned()
            .collect();
        Box::pin(async move { Ok(matching) })
    }

    fn create_pull_request<'a>(
        &'a self,
        repo: &'a RemoteIdentity,
        request: &'a NewPullRequest,
    ) -> HostFuture<'a, PullRequest> {
        let created = {
            let mut state = self.lock();
            let last = state.pull_requests.iter().map(|pr| pr.number).max();
            let number = last.unwrap_or(0) + 1;
            let mut pr = pull_request(
                number,
                &request.head,
                &request.base,
                PullRequestState::Open,
                None,
            );
            pr.html_url = format!(
                "https://github.com/{}/{}/pull/{number}",
                repo.owner, repo.name
            );
            pr.title.clone_from(&request.title);
            pr.body = Some(request.body.clone());
            state.pull_requests.push(pr.clone());
            state.created.push(request.clone());
            pr
        };
        Box::pin(async move { Ok(created) })
    }

    fn close_pull_request<'a>(
        &'a self,
        repo: &'a RemoteIdentity,
        number: u64,
    ) -> HostFuture<'a, PullRequest> {
        let result = {
            let mut state = self.lock();
            state.closed.push(number);
            match state.pull_requests.iter_mut().find(|pr| pr.number == number) {
                Some(pr) => {
                    pr.state = PullRequestState::Closed;
                    Ok(pr.clone())
                }
                None => Err(not_found(repo, number)),
            }
        };
        Box::pin(async move { result })
    }

    fn list_reviews<'a>(
        &'a self,
        _repo: &'a RemoteIdentity,
        number: u64,
    ) -> HostFuture<'a, Vec<Review>> {
        let reviews = self
            .lock()
            .reviews
            .get(&number)
            .cloned()
            .unwrap_or_default();
        Box::pin(async move { Ok(reviews) })
    }
}

fn not_found(repo: &RemoteIdentity, number: u64) -> Error {
    Error::GitHub {
        path: format!("/repos/{}/{}/pulls/{number}", repo.owner, repo.name),
        status: 404,
        body: "Not Found".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RemoteIdentity {
        RemoteIdentity {
            remote: "origin".into(),
            owner: "acme".into(),
            name: "widgets".into(),
        }
    }

    #[tokio::test]
    async fn filters_by_head_and_base() {
        let host = MemoryCodeHost::new()
            .with_pull_request(pull_request(1, "a", "main", PullRequestState::Open, None))
            .with_pull_request(pull_request(2, "b", "main", PullRequestState::Open, None))
            .with_pull_request(pull_request(3, "a", "develop", PullRequestState::Open, None));

        let for_a = host
            .list_pull_requests(&repo(), Some("a"), "main")
            .await
            .unwrap();
        let all = host.list_pull_requests(&repo(), None, "main").await.unwrap();

        assert_eq!(for_a.iter().map(|pr| pr.number).collect::<Vec<_>>(), vec![1]);
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn closing_unknown_pull_request_is_not_found() {
        let host = MemoryCodeHost::new();
        let err = host.close_pull_request(&repo(), 42).await.unwrap_err();
        assert!(matches!(err, Error::GitHub { status: 404, .. }));
    }
}
