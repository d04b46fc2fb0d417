//! Live adapter for the `CodeHost` port using the GitHub REST API.

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::context::RemoteIdentity;
use crate::error::{Error, Result};
use crate::ports::hosting::{CodeHost, HostFuture, NewPullRequest, PullRequest, Review};

/// Public GitHub API host.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const CLIENT_USER_AGENT: &str = concat!("erised/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubConfig {
    /// API base URL without a trailing slash, e.g. [`DEFAULT_API_BASE`].
    pub api_base: String,
    /// Bearer token.
    pub token: String,
}

/// Live code host that calls the GitHub REST API.
pub struct GitHubClient {
    client: Client,
    config: GitHubConfig,
}

/// Body of a `PATCH /pulls/{number}` that closes a pull request.
#[derive(Serialize)]
struct StateUpdate<'a> {
    state: &'a str,
}

impl GitHubClient {
    /// Creates a client for the given API base and credential.
    #[must_use]
    pub fn new(config: GitHubConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base.trim_end_matches('/'))
    }

    /// Sends an authorized request and decodes a JSON response.
    async fn send<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> Result<T> {
        debug!(path, "requesting GitHub API");
        let response = request
            .bearer_auth(&self.config.token)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::GitHub {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::GitHub {
            path: path.to_string(),
            status: status.as_u16(),
            body: format!("Failed to decode response: {e}\n{body}"),
        })
    }
}

fn pulls_path(repo: &RemoteIdentity) -> String {
    format!("/repos/{}/{}/pulls", repo.owner, repo.name)
}

impl CodeHost for GitHubClient {
    fn list_pull_requests<'a>(
        &'a self,
        repo: &'a RemoteIdentity,
        head: Option<&'a str>,
        base: &'a str,
    ) -> HostFuture<'a, Vec<PullRequest>> {
        Box::pin(async move {
            let path = pulls_path(repo);
            let mut query = vec![
                ("state", "all".to_string()),
                ("base", base.to_string()),
                ("per_page", "100".to_string()),
            ];
            if let Some(head) = head {
                // GitHub only filters by head when it is qualified with the owner.
                query.push(("head", format!("{}:{head}", repo.owner)));
            }
            let request = self.client.get(self.url(&path)).query(&query);
            self.send(&path, request).await
        })
    }

    fn create_pull_request<'a>(
        &'a self,
        repo: &'a RemoteIdentity,
        request: &'a NewPullRequest,
    ) -> HostFuture<'a, PullRequest> {
        Box::pin(async move {
            let path = pulls_path(repo);
            let builder = self.client.post(self.url(&path)).json(request);
            self.send(&path, builder).await
        })
    }

    fn close_pull_request<'a>(
        &'a self,
        repo: &'a RemoteIdentity,
        number: u64,
    ) -> HostFuture<'a, PullRequest> {
        Box::pin(async move {
            let path = format!("{}/{number}", pulls_path(repo));
            let update = StateUpdate { state: "closed" };
            let builder = self.client.patch(self.url(&path)).json(&update);
            self.send(&path, builder).await
        })
    }

    fn list_reviews<'a>(
        &'a self,
        repo: &'a RemoteIdentity,
        number: u64,
    ) -> HostFuture<'a, Vec<Review>> {
        Box::pin(async move {
            let path = format!("{}/{number}/reviews", pulls_path(repo));
            let query = [("per_page", "100")];
            let builder = self.client.get(self.url(&path)).query(&query);
            self.send(&path, builder).await
        })
    }
}
