//! Throwaway git repositories for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use erised::adapters::live::LiveGitRepo;
use erised::context::RepoContext;
use uuid::Uuid;

/// Branch every fixture starts working on.
pub const WORKING_BRANCH: &str = "example_branch";

/// A git repository in a unique temp directory, with `main` holding one
/// commit and [`WORKING_BRANCH`] checked out.
///
/// The `origin` remote reports a GitHub URL but pushes to a bare repository
/// next to the working copy.
pub struct TestRepository {
    root: PathBuf,
    origin: PathBuf,
    commit_counter: usize,
}

impl TestRepository {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        let root = std::env::temp_dir().join(format!("erised_test_{id}"));
        let origin = std::env::temp_dir().join(format!("erised_test_{id}_origin.git"));
        fs::create_dir_all(&root).expect("failed to create test repository");
        fs::create_dir_all(&origin).expect("failed to create test origin");

        git_in(&origin, &["init", "-q", "--bare"]);

        let repo = Self {
            root,
            origin,
            commit_counter: 0,
        };
        repo.git(&["init", "-q"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo.git(&["config", "user.name", "Erised Test"]);
        repo.git(&["config", "user.email", "erised@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        let url = "https://github.com/acme/widgets.git";
        repo.git(&["remote", "add", "origin", url]);
        let push_url = repo.origin.display().to_string();
        repo.git(&["config", "remote.origin.pushurl", &push_url]);

        repo.write("README.md", "# widgets\n");
        repo.git(&["add", "--all"]);
        repo.git(&["commit", "-q", "-m", "initial commit"]);
        repo.git(&["push", "-q", "origin", "main"]);
        repo.git(&["checkout", "-q", "-b", WORKING_BRANCH]);
        repo
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Live adapter rooted at this repository.
    pub fn adapter(&self) -> LiveGitRepo {
        LiveGitRepo::new(&self.root)
    }

    pub fn context(&self) -> RepoContext {
        RepoContext::load(&self.adapter(), "origin").expect("failed to load repository context")
    }

    /// Runs git in the working copy and returns trimmed stdout, panicking on
    /// failure.
    pub fn git(&self, args: &[&str]) -> String {
        git_in(&self.root, args)
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directory");
        }
        fs::write(path, contents).expect("failed to write file");
    }

    /// Touches every file with fresh contents and commits them. Without a
    /// message the commit is named after the counter.
    pub fn commit(&mut self, files: &[&str], message: Option<&str>) {
        self.commit_counter += 1;
        for file in files {
            self.write(file, &format!("change {}\n", self.commit_counter));
        }
        let message =
            message.map_or_else(|| format!("commit {}", self.commit_counter), str::to_string);
        self.git(&["add", "--all"]);
        self.git(&["commit", "-q", "-m", &message]);
    }

    /// Local branch names, sorted.
    pub fn branches(&self) -> Vec<String> {
        let mut branches: Vec<String> = self
            .git(&["branch", "--list", "--format=%(refname:short)"])
            .lines()
            .map(str::to_string)
            .collect();
        branches.sort();
        branches
    }

    /// Files changed between `main` and `branch`.
    pub fn files_on(&self, branch: &str) -> Vec<String> {
        let range = format!("main...{branch}");
        self.git(&["diff", "--name-only", &range])
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Tree hash of `branch`.
    pub fn tree_of(&self, branch: &str) -> String {
        self.git(&["rev-parse", &format!("{branch}^{{tree}}")])
    }

    /// Heads present in the bare origin.
    pub fn origin_heads(&self) -> Vec<String> {
        git_in(&self.origin, &["branch", "--list", "--format=%(refname:short)"])
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Drop for TestRepository {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
        let _ = fs::remove_dir_all(&self.origin);
    }
}

fn git_in(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
