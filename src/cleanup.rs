//! Removing mirrored branches that are no longer needed.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, info};

use crate::boundary::{self, BoundaryRules};
use crate::changeset;
use crate::context::RepoContext;
use crate::error::Result;
use crate::ports::git::GitRepo;
use crate::ports::hosting::CodeHost;

/// Why a mirrored branch was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupReason {
    /// Its pull request was merged.
    Merged,
    /// No current boundary maps to it any more.
    Stale,
}

impl fmt::Display for CleanupReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merged => write!(f, "merged"),
            Self::Stale => write!(f, "stale"),
        }
    }
}

/// Outcome of a cleanup run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Deleted local branches.
    pub deleted: Vec<(String, CleanupReason)>,
    /// Pull requests closed because their branch went stale.
    pub closed_pull_requests: Vec<u64>,
    /// Mirrored branches left in place.
    pub kept: Vec<String>,
}

/// Deletes mirrored branches whose pull request was merged, and those no
/// current boundary produces, closing the open pull requests of the latter.
///
/// Only local branches are deleted; the working tree is left alone.
///
/// # Errors
///
/// Returns an error if git or GitHub cannot be queried, or a branch cannot be
/// deleted.
pub async fn cleanup(
    git: &dyn GitRepo,
    host: &dyn CodeHost,
    repo: &RepoContext,
    rules: &BoundaryRules,
) -> Result<CleanupReport> {
    let branches = git.list_branches()?;
    let mirrored = boundary::filter_mirrored_branches(&branches, &repo.current_branch);
    let expected: BTreeSet<String> = changeset::current_boundaries(git, repo, rules)?
        .iter()
        .map(|b| b.branch_name(&repo.current_branch))
        .collect();
    debug!(?mirrored, ?expected, "cleaning up mirrored branches");

    let mut report = CleanupReport::default();
    for branch in mirrored {
        let pull_requests = host
            .list_pull_requests(&repo.remote, Some(&branch), &repo.main_branch)
            .await?;

        let reason = if pull_requests.iter().any(|pr| pr.is_merged()) {
            CleanupReason::Merged
        } else if expected.contains(&branch) {
            report.kept.push(branch);
            continue;
        } else {
            for pr in pull_requests.iter().filter(|pr| pr.is_open()) {
                host.close_pull_request(&repo.remote, pr.number).await?;
                info!(%branch, number = pr.number, "closed pull request");
                report.closed_pull_requests.push(pr.number);
            }
            CleanupReason::Stale
        };

        git.delete_branch(&branch, false)?;
        info!(%branch, %reason, "deleted mirrored branch");
        report.deleted.push((branch, reason));
    }
    Ok(report)
}
