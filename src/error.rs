//! Error type shared by every erised operation.

use thiserror::Error;

/// Number of characters of captured process output kept in a [`Error::Git`].
pub const OUTPUT_EXCERPT_LEN: usize = 1000;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while mirroring, uploading or inspecting boundary branches.
#[derive(Debug, Error)]
pub enum Error {
    /// The working tree has uncommitted or untracked changes.
    #[error("Git detects untracked changes, please discard or commit before proceeding.\n{0}")]
    DirtyWorkingTree(String),

    /// Nothing has been committed on the current branch since it diverged.
    #[error("Failed to find any commits since common ancestor ({0})")]
    NoCommitsSinceAncestor(String),

    /// The current branch and the main branch share no history.
    #[error("No common ancestor between {branch} and {main_branch}")]
    MissingMergeBase {
        /// The branch being mirrored.
        branch: String,
        /// The resolved main branch.
        main_branch: String,
    },

    /// The remote URL could not be turned into an owner/repository pair.
    #[error("Unable to determine the GitHub repository for remote {remote}: {url}")]
    RemoteIdentity {
        /// Remote name, e.g. `origin`.
        remote: String,
        /// The URL as configured on the remote.
        url: String,
    },

    /// A git invocation exited unsuccessfully.
    #[error("Git command \"{command}\" failed:\n{stderr}\n{stdout}")]
    Git {
        /// The arguments passed to git, space separated.
        command: String,
        /// Truncated standard error.
        stderr: String,
        /// Truncated standard output.
        stdout: String,
    },

    /// The GitHub API answered with a non-success status.
    #[error("Failed to request {path} ({status}):\n{body}")]
    GitHub {
        /// Request path relative to the API base.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Response body as text.
        body: String,
    },

    /// The HTTP request could not be sent or its response decoded.
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// No credential was supplied for a command that talks to GitHub.
    #[error("A GitHub token is required: pass --github-token or set ERISED_GITHUB_TOKEN")]
    MissingToken,

    /// `.erised.yaml` exists but could not be parsed.
    #[error("Failed to parse preferences {path}: {message}")]
    Preferences {
        /// Path of the preferences file.
        path: String,
        /// Parser error message.
        message: String,
    },

    /// Local I/O failure (spawning git, reading files).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds a [`Error::Git`] from raw process output, keeping only the
    /// first [`OUTPUT_EXCERPT_LEN`] characters of each stream.
    #[must_use]
    pub fn git(args: &[&str], stderr: &str, stdout: &str) -> Self {
        Self::Git {
            command: args.join(" "),
            stderr: excerpt(stderr),
            stdout: excerpt(stdout),
        }
    }
}

fn excerpt(output: &str) -> String {
    output.chars().take(OUTPUT_EXCERPT_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_error_truncates_output() {
        let long = "x".repeat(OUTPUT_EXCERPT_LEN + 500);
        let err = Error::git(&["commit", "-m", "msg"], &long, "ok");

        let Error::Git { stderr, .. } = &err else {
            panic!("expected git error");
        };
        assert_eq!(stderr.len(), OUTPUT_EXCERPT_LEN);
        let message = err.to_string();
        assert!(message.starts_with("Git command \"commit -m msg\" failed:"));
        assert!(message.ends_with("\nok"));
    }

    #[test]
    fn dirty_tree_message_lists_changes() {
        let err = Error::DirtyWorkingTree(" M packages/foo/a.js".into());
        assert!(err.to_string().contains("packages/foo/a.js"));
    }
}
