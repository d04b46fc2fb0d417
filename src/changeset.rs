//! Queries shared by every orchestrator: what changed since the branch
//! diverged, and which commit message describes it.

use tracing::debug;

use crate::boundary::{self, Boundary, BoundaryRules};
use crate::context::RepoContext;
use crate::error::{Error, Result};
use crate::ports::git::GitRepo;

/// Fails with [`Error::DirtyWorkingTree`] unless the working tree is clean.
///
/// # Errors
///
/// Returns an error if there are pending changes or status cannot be read.
pub fn assert_clean_working_tree(git: &dyn GitRepo) -> Result<()> {
    let changes = git.working_tree_changes()?;
    if changes.is_empty() {
        Ok(())
    } else {
        Err(Error::DirtyWorkingTree(changes.join("\n")))
    }
}

/// The merge base of the current branch and the main branch.
///
/// # Errors
///
/// Returns [`Error::MissingMergeBase`] when the histories are unrelated.
pub fn common_ancestor(git: &dyn GitRepo, repo: &RepoContext) -> Result<String> {
    git.common_ancestor(&repo.current_branch, &repo.main_branch)
        .map_err(|err| match err {
            Error::Git { .. } => {
                debug!(error = %err, "merge-base failed");
                Error::MissingMergeBase {
                    branch: repo.current_branch.clone(),
                    main_branch: repo.main_branch.clone(),
                }
            }
            other => other,
        })
}

/// Boundaries of everything changed since the common ancestor.
///
/// # Errors
///
/// Returns an error if the ancestor or the diff cannot be computed.
pub fn current_boundaries(
    git: &dyn GitRepo,
    repo: &RepoContext,
    rules: &BoundaryRules,
) -> Result<Vec<Boundary>> {
    let ancestor = common_ancestor(git, repo)?;
    let changed_files = git.changed_files_since(&ancestor)?;
    debug!(%ancestor, count = changed_files.len(), "collected changed files");
    Ok(boundary::resolve(rules, &changed_files))
}

/// Message of the oldest commit made since the common ancestor.
///
/// # Errors
///
/// Returns [`Error::NoCommitsSinceAncestor`] if the branch has no commits of
/// its own.
pub fn propagated_message(git: &dyn GitRepo, repo: &RepoContext) -> Result<String> {
    let ancestor = common_ancestor(git, repo)?;
    let commits = git.commits_since(&ancestor)?;
    debug!(%ancestor, ?commits, "collected commits since ancestor");
    let first = commits
        .last()
        .ok_or_else(|| Error::NoCommitsSinceAncestor(ancestor.clone()))?;
    git.commit_message(first)
}

/// Splits a commit message into a pull request title and body.
#[must_use]
pub fn split_message(message: &str) -> (String, String) {
    match message.split_once('\n') {
        Some((title, body)) => (title.to_string(), body.to_string()),
        None => (message.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryGitRepo;
    use crate::context::RemoteIdentity;

    fn repo() -> RepoContext {
        RepoContext {
            root: "/repo".into(),
            current_branch: "feat".into(),
            main_branch: "main".into(),
            remote: RemoteIdentity {
                remote: "origin".into(),
                owner: "acme".into(),
                name: "widgets".into(),
            },
        }
    }

    #[test]
    fn picks_oldest_commit_message() {
        let commits = [
            ("c3", "fix: third"),
            ("c2", "fix: second"),
            ("c1", "feat: first\n\ndetails"),
        ];
        let git = MemoryGitRepo::new("feat").with_commits(&commits);

        let message = propagated_message(&git, &repo()).unwrap();
        assert_eq!(message, "feat: first\n\ndetails");
    }

    #[test]
    fn no_commits_is_an_error() {
        let git = MemoryGitRepo::new("feat");
        let err = propagated_message(&git, &repo()).unwrap_err();
        assert!(matches!(err, Error::NoCommitsSinceAncestor(ref base) if base == "base"));
    }

    #[test]
    fn unrelated_histories_have_no_ancestor() {
        let git = MemoryGitRepo::new("feat").with_merge_base(None);
        let err = common_ancestor(&git, &repo()).unwrap_err();
        assert!(matches!(err, Error::MissingMergeBase { .. }));
    }

    #[test]
    fn dirty_tree_is_rejected() {
        let git = MemoryGitRepo::new("feat").with_dirty(&["?? scratch.txt"]);
        let err = assert_clean_working_tree(&git).unwrap_err();
        assert!(err.to_string().contains("scratch.txt"));
    }

    #[test]
    fn splits_title_from_body() {
        let (title, body) = split_message("feat: commit\nbody line1\nbody line2");
        assert_eq!(title, "feat: commit");
        assert_eq!(body, "body line1\nbody line2");

        let (title, body) = split_message("feat: only");
        assert_eq!(title, "feat: only");
        assert!(body.is_empty());
    }
}
