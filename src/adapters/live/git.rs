//! Live git adapter using `git` CLI commands.

use std::path::PathBuf;
use std::process::{Command, Output};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::ports::git::GitRepo;

/// Live git adapter that shells out to the `git` CLI inside a working tree.
#[derive(Debug, Clone)]
pub struct LiveGitRepo {
    root: PathBuf,
}

impl LiveGitRepo {
    /// Creates an adapter operating on the working tree at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Locates the working-tree root containing the process's current
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory is not inside a git
    /// repository.
    pub fn discover() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let toplevel = Self::new(cwd).run(&["rev-parse", "--show-toplevel"])?;
        Ok(Self::new(toplevel))
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        debug!(cwd = %self.root.display(), "git {}", args.join(" "));
        Ok(Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()?)
    }

    /// Runs git and returns trimmed stdout, failing on a non-zero exit.
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git(args, &stderr, &stdout));
        }
        Ok(stdout.trim().to_string())
    }

    /// Runs git and reports only whether it succeeded.
    fn succeeds(&self, args: &[&str]) -> bool {
        self.output(args).is_ok_and(|o| o.status.success())
    }
}

fn lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

impl GitRepo for LiveGitRepo {
    fn root(&self) -> Result<PathBuf> {
        Ok(self.root.clone())
    }

    fn current_branch(&self) -> Result<String> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn ref_exists(&self, reference: &str) -> bool {
        self.succeeds(&["rev-parse", "--verify", "--quiet", reference])
    }

    fn remote_url(&self, remote: &str) -> Result<String> {
        self.run(&["remote", "get-url", remote])
    }

    fn common_ancestor(&self, a: &str, b: &str) -> Result<String> {
        self.run(&["merge-base", a, b])
    }

    fn changed_files_since(&self, revision: &str) -> Result<Vec<String>> {
        Ok(lines(&self.run(&["diff", "--name-only", "--no-renames", revision])?))
    }

    fn commits_since(&self, revision: &str) -> Result<Vec<String>> {
        let range = format!("{revision}..HEAD");
        Ok(lines(&self.run(&["log", "--pretty=format:%H", &range])?))
    }

    fn commit_message(&self, revision: &str) -> Result<String> {
        self.run(&["log", "--pretty=format:%B", "-n", "1", revision])
    }

    fn working_tree_changes(&self) -> Result<Vec<String>> {
        Ok(lines(&self.run(&["status", "--porcelain"])?))
    }

    fn branch_exists(&self, name: &str) -> bool {
        let reference = format!("refs/heads/{name}");
        self.succeeds(&["show-ref", "--verify", "--quiet", &reference])
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        self.run(&["checkout", "-b", name]).map(drop)
    }

    fn delete_branch(&self, name: &str, ignore_missing: bool) -> Result<()> {
        match self.run(&["branch", "-D", name]) {
            Ok(_) => Ok(()),
            Err(err) if ignore_missing => {
                debug!(branch = name, error = %err, "ignoring failed branch deletion");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn checkout(&self, name: &str, force: bool) -> Result<()> {
        if force {
            self.run(&["checkout", "-f", name]).map(drop)
        } else {
            self.run(&["checkout", name]).map(drop)
        }
    }

    fn reset_index_to(&self, reference: &str) -> Result<()> {
        self.run(&["reset", "-q", reference]).map(drop)
    }

    fn stage(&self, paths: &[String]) -> Result<()> {
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run(&args).map(drop)
    }

    fn commit(&self, message: &str, skip_hooks: bool) -> Result<()> {
        let mut args = vec!["commit"];
        if skip_hooks {
            args.push("--no-verify");
        }
        args.extend(["-m", message]);
        self.run(&args).map(drop)
    }

    fn push(&self, remote: &str, branch: &str, force: bool) -> Result<()> {
        let mut args = vec!["push"];
        if force {
            args.push("-f");
        }
        args.extend(["-u", remote, branch]);
        self.run(&args).map(drop)
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        let stdout = self.run(&["branch", "--list", "--format=%(refname:short)"])?;
        let mut branches = lines(&stdout);
        branches.sort();
        Ok(branches)
    }

    fn last_commit_time(&self, reference: &str) -> Result<Option<DateTime<Utc>>> {
        let Ok(stdout) = self.run(&["log", "-1", "--format=%cI", reference, "--"]) else {
            return Ok(None);
        };
        let parsed = DateTime::parse_from_rfc3339(&stdout).map_err(|e| {
            Error::git(
                &["log", "-1", "--format=%cI", reference],
                &e.to_string(),
                &stdout,
            )
        })?;
        Ok(Some(parsed.with_timezone(&Utc)))
    }
}
