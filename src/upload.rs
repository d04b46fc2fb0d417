//! Uploading mirrored branches and keeping one pull request per branch.
//!
//! The set of branches comes from the local branch list, not from the
//! boundary rules, so an upload publishes whatever the last mirror produced.

use tracing::info;

use crate::boundary;
use crate::changeset;
use crate::context::RepoContext;
use crate::error::Result;
use crate::ports::git::GitRepo;
use crate::ports::hosting::{CodeHost, NewPullRequest, PullRequest};

/// What happened to one mirrored branch during an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedBranch {
    /// The mirrored branch that was pushed.
    pub branch: String,
    /// URL of the pull request tracking it.
    pub pull_request_url: String,
    /// Whether the pull request was opened by this run.
    pub created: bool,
}

/// Pushes every mirrored branch of the current branch and makes sure each
/// has an open or merged pull request.
///
/// The first failing push or API call stops the run; branches uploaded
/// before it stay uploaded.
///
/// # Errors
///
/// Returns an error on a dirty tree, a missing propagated message, or any
/// git or GitHub failure.
pub async fn upload(
    git: &dyn GitRepo,
    host: &dyn CodeHost,
    repo: &RepoContext,
) -> Result<Vec<UploadedBranch>> {
    changeset::assert_clean_working_tree(git)?;

    let local_branches = git.list_branches()?;
    let branches = boundary::filter_mirrored_branches(&local_branches, &repo.current_branch);
    if branches.is_empty() {
        info!("no mirrored branches to upload");
        return Ok(Vec::new());
    }
    info!(count = branches.len(), "uploading mirrored branches");

    let message = changeset::propagated_message(git, repo)?;
    let (title, body) = changeset::split_message(&message);

    let mut uploaded = Vec::with_capacity(branches.len());
    for branch in branches {
        info!(%branch, "uploading");
        git.checkout(&branch, true)?;
        git.push(&repo.remote.remote, &branch, true)?;

        let existing = host
            .list_pull_requests(&repo.remote, Some(&branch), &repo.main_branch)
            .await?;
        let entry = match reusable_pull_request(&existing) {
            Some(pr) => {
                info!(%branch, url = %pr.html_url, "pull request already exists");
                UploadedBranch {
                    pull_request_url: pr.html_url.clone(),
                    branch,
                    created: false,
                }
            }
            None => {
                let request = NewPullRequest {
                    title: title.clone(),
                    body: body.clone(),
                    head: branch.clone(),
                    base: repo.main_branch.clone(),
                };
                let created = host.create_pull_request(&repo.remote, &request).await?;
                info!(%branch, url = %created.html_url, "opened pull request");
                UploadedBranch {
                    pull_request_url: created.html_url,
                    branch,
                    created: true,
                }
            }
        };
        uploaded.push(entry);
    }

    git.checkout(&repo.current_branch, true)?;
    Ok(uploaded)
}

/// An open pull request, or one that has already been merged.
fn reusable_pull_request(pull_requests: &[PullRequest]) -> Option<&PullRequest> {
    pull_requests
        .iter()
        .find(|pr| pr.is_open() || pr.is_merged())
}
