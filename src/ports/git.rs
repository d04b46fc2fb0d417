//! Git repository port for version-control queries and branch surgery.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::Result;

/// Read and write access to a git working copy.
///
/// Every method is a blocking call. Abstracting git access allows the
/// orchestrators to be tested against an in-memory repository.
pub trait GitRepo: Send + Sync {
    /// Absolute path of the working-tree root.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined.
    fn root(&self) -> Result<PathBuf>;

    /// Name of the branch currently checked out.
    ///
    /// # Errors
    ///
    /// Returns an error if HEAD cannot be resolved.
    fn current_branch(&self) -> Result<String>;

    /// Whether `reference` resolves to a commit.
    fn ref_exists(&self, reference: &str) -> bool;

    /// Returns `main` when `<remote>/main` resolves, `master` otherwise.
    fn resolved_main_branch(&self, remote: &str) -> String {
        if self.ref_exists(&format!("{remote}/main")) {
            "main".to_string()
        } else {
            "master".to_string()
        }
    }

    /// The fetch URL configured for `remote`.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote does not exist.
    fn remote_url(&self, remote: &str) -> Result<String>;

    /// The best common ancestor of two revisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the histories are unrelated.
    fn common_ancestor(&self, a: &str, b: &str) -> Result<String>;

    /// Paths changed between `revision` and the working tree, deduplicated,
    /// in git's deterministic order.
    ///
    /// # Errors
    ///
    /// Returns an error if the diff cannot be computed.
    fn changed_files_since(&self, revision: &str) -> Result<Vec<String>>;

    /// Commit hashes in `revision..HEAD`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read.
    fn commits_since(&self, revision: &str) -> Result<Vec<String>>;

    /// Full message (subject and body) of a commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit does not exist.
    fn commit_message(&self, revision: &str) -> Result<String>;

    /// Porcelain status lines for uncommitted or untracked changes.
    ///
    /// # Errors
    ///
    /// Returns an error if status cannot be read.
    fn working_tree_changes(&self) -> Result<Vec<String>>;

    /// Whether the working tree has no pending changes.
    ///
    /// # Errors
    ///
    /// Returns an error if status cannot be read.
    fn is_working_tree_clean(&self) -> Result<bool> {
        Ok(self.working_tree_changes()?.is_empty())
    }

    /// Whether a local branch named `name` exists.
    fn branch_exists(&self, name: &str) -> bool;

    /// Creates `name` at the current position and checks it out.
    ///
    /// # Errors
    ///
    /// Returns an error if the branch already exists or cannot be created.
    fn create_branch(&self, name: &str) -> Result<()>;

    /// Force-deletes a local branch. With `ignore_missing`, failures are
    /// swallowed.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails and `ignore_missing` is false.
    fn delete_branch(&self, name: &str, ignore_missing: bool) -> Result<()>;

    /// Checks out `name`, discarding local modifications when `force` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout fails.
    fn checkout(&self, name: &str, force: bool) -> Result<()>;

    /// Mixed reset of the index to `reference`, leaving the working tree
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset fails.
    fn reset_index_to(&self, reference: &str) -> Result<()>;

    /// Stages exactly the given paths, including deletions.
    ///
    /// # Errors
    ///
    /// Returns an error if any path cannot be staged.
    fn stage(&self, paths: &[String]) -> Result<()>;

    /// Commits the index with `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    fn commit(&self, message: &str, skip_hooks: bool) -> Result<()>;

    /// Pushes `branch` to `remote`, setting it as upstream.
    ///
    /// # Errors
    ///
    /// Returns an error if the push is rejected or the remote is unreachable.
    fn push(&self, remote: &str, branch: &str, force: bool) -> Result<()>;

    /// Names of all local branches, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if branches cannot be listed.
    fn list_branches(&self) -> Result<Vec<String>>;

    /// Committer time of the tip of `reference`, or `None` when it does not
    /// resolve.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp cannot be parsed.
    fn last_commit_time(&self, reference: &str) -> Result<Option<DateTime<Utc>>>;
}
