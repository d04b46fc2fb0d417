//! In-memory `GitRepo` that records every mutating operation.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::ports::git::GitRepo;

/// Files and message of the last commit made on a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Commit message.
    pub message: String,
    /// Paths staged when the commit was made.
    pub files: Vec<String>,
    /// Whether hooks were bypassed.
    pub skipped_hooks: bool,
}

#[derive(Debug)]
struct GitState {
    root: PathBuf,
    current_branch: String,
    head: String,
    branches: BTreeMap<String, DateTime<Utc>>,
    remote_branches: BTreeMap<String, DateTime<Utc>>,
    extra_refs: BTreeSet<String>,
    remote_urls: HashMap<String, String>,
    merge_base: Option<String>,
    changed_files: Vec<String>,
    commits: Vec<(String, String)>,
    dirty: Vec<String>,
    staged: Vec<String>,
    last_commits: BTreeMap<String, CommitRecord>,
    commit_time: DateTime<Utc>,
    failing_on: Option<String>,
    operations: Vec<String>,
}

/// A scripted git repository held entirely in memory.
///
/// Queries answer from the configured state; mutations update it and append
/// a `git`-style line to [`MemoryGitRepo::operations`].
#[derive(Debug)]
pub struct MemoryGitRepo {
    state: Mutex<GitState>,
}

impl MemoryGitRepo {
    /// Creates a repository with `current_branch` checked out and a merge
    /// base named `base`.
    #[must_use]
    pub fn new(current_branch: &str) -> Self {
        let initial_time = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        let mut branches = BTreeMap::new();
        branches.insert(current_branch.to_string(), initial_time);
        Self {
            state: Mutex::new(GitState {
                root: PathBuf::from("/repo"),
                current_branch: current_branch.to_string(),
                head: current_branch.to_string(),
                branches,
                remote_branches: BTreeMap::new(),
                extra_refs: BTreeSet::new(),
                remote_urls: HashMap::new(),
                merge_base: Some("base".to_string()),
                changed_files: Vec::new(),
                commits: Vec::new(),
                dirty: Vec::new(),
                staged: Vec::new(),
                last_commits: BTreeMap::new(),
                commit_time: initial_time,
                failing_on: None,
                operations: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GitState> {
        self.state.lock().expect("memory git lock poisoned")
    }

    fn edit(self, f: impl FnOnce(&mut GitState)) -> Self {
        f(&mut self.lock());
        self
    }

    /// Sets the URL of `remote`.
    #[must_use]
    pub fn with_remote_url(self, remote: &str, url: &str) -> Self {
        self.edit(|s| {
            s.remote_urls.insert(remote.to_string(), url.to_string());
        })
    }

    /// Makes an arbitrary reference resolvable.
    #[must_use]
    pub fn with_ref(self, reference: &str) -> Self {
        self.edit(|s| {
            s.extra_refs.insert(reference.to_string());
        })
    }

    /// Adds or moves a local branch whose tip was committed at `time`.
    #[must_use]
    pub fn with_branch(self, name: &str, time: DateTime<Utc>) -> Self {
        self.edit(|s| {
            s.branches.insert(name.to_string(), time);
        })
    }

    /// Adds a remote-tracking ref such as `origin/feat` committed at `time`.
    #[must_use]
    pub fn with_remote_branch(self, reference: &str, time: DateTime<Utc>) -> Self {
        self.edit(|s| {
            s.remote_branches.insert(reference.to_string(), time);
        })
    }

    /// Sets the merge base; `None` simulates unrelated histories.
    #[must_use]
    pub fn with_merge_base(self, merge_base: Option<&str>) -> Self {
        self.edit(|s| s.merge_base = merge_base.map(String::from))
    }

    /// Sets the paths reported as changed since the merge base.
    #[must_use]
    pub fn with_changed_files(self, files: &[&str]) -> Self {
        self.edit(|s| s.changed_files = files.iter().map(|f| (*f).to_string()).collect())
    }

    /// Sets the commits since the merge base as `(hash, message)`, newest
    /// first.
    #[must_use]
    pub fn with_commits(self, commits: &[(&str, &str)]) -> Self {
        self.edit(|s| {
            s.commits = commits
                .iter()
                .map(|(h, m)| ((*h).to_string(), (*m).to_string()))
                .collect();
        })
    }

    /// Marks the working tree dirty with the given porcelain lines.
    #[must_use]
    pub fn with_dirty(self, lines: &[&str]) -> Self {
        self.edit(|s| s.dirty = lines.iter().map(|l| (*l).to_string()).collect())
    }

    /// Timestamp given to commits made through [`GitRepo::commit`].
    #[must_use]
    pub fn with_commit_time(self, time: DateTime<Utc>) -> Self {
        self.edit(|s| s.commit_time = time)
    }

    /// Makes every operation whose log line starts with `prefix` fail.
    #[must_use]
    pub fn failing_on(self, prefix: &str) -> Self {
        self.edit(|s| s.failing_on = Some(prefix.to_string()))
    }

    /// Mutating operations performed so far, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<String> {
        self.lock().operations.clone()
    }

    /// The last commit made on `branch` through this adapter.
    #[must_use]
    pub fn last_commit(&self, branch: &str) -> Option<CommitRecord> {
        self.lock().last_commits.get(branch).cloned()
    }

    /// Branch currently checked out.
    #[must_use]
    pub fn head(&self) -> String {
        self.lock().head.clone()
    }
}

impl GitState {
    fn record(&mut self, line: String) -> Result<()> {
        let failed = self
            .failing_on
            .as_deref()
            .is_some_and(|p| line.starts_with(p));
        self.operations.push(line.clone());
        if failed {
            let args: Vec<&str> = line.split(' ').collect();
            return Err(Error::git(&args, "simulated failure", ""));
        }
        Ok(())
    }

    fn time_of(&self, reference: &str) -> Option<DateTime<Utc>> {
        let reference = if reference == "HEAD" {
            self.head.as_str()
        } else {
            reference
        };
        self.branches
            .get(reference)
            .or_else(|| self.remote_branches.get(reference))
            .copied()
    }
}

impl GitRepo for MemoryGitRepo {
    fn root(&self) -> Result<PathBuf> {
        Ok(self.lock().root.clone())
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.lock().current_branch.clone())
    }

    fn ref_exists(&self, reference: &str) -> bool {
        let state = self.lock();
        state.extra_refs.contains(reference) || state.time_of(reference).is_some()
    }

    fn remote_url(&self, remote: &str) -> Result<String> {
        self.lock()
            .remote_urls
            .get(remote)
            .cloned()
            .ok_or_else(|| Error::git(&["remote", "get-url", remote], "No such remote", ""))
    }

    fn common_ancestor(&self, a: &str, b: &str) -> Result<String> {
        self.lock()
            .merge_base
            .clone()
            .ok_or_else(|| Error::git(&["merge-base", a, b], "", ""))
    }

    fn changed_files_since(&self, _revision: &str) -> Result<Vec<String>> {
        Ok(self.lock().changed_files.clone())
    }

    fn commits_since(&self, _revision: &str) -> Result<Vec<String>> {
        let state = self.lock();
        Ok(state.commits.iter().map(|(hash, _)| hash.clone()).collect())
    }

    fn commit_message(&self, revision: &str) -> Result<String> {
        self.lock()
            .commits
            .iter()
            .find(|(hash, _)| hash == revision)
            .map(|(_, message)| message.clone())
            .ok_or_else(|| Error::git(&["log", "-n", "1", revision], "unknown revision", ""))
    }

    fn working_tree_changes(&self) -> Result<Vec<String>> {
        Ok(self.lock().dirty.clone())
    }

    fn branch_exists(&self, name: &str) -> bool {
        self.lock().branches.contains_key(name)
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        state.record(format!("checkout -b {name}"))?;
        if state.branches.contains_key(name) {
            return Err(Error::git(&["checkout", "-b", name], "branch already exists", ""));
        }
        let tip = state.time_of("HEAD").unwrap_or_default();
        state.branches.insert(name.to_string(), tip);
        state.head = name.to_string();
        Ok(())
    }

    fn delete_branch(&self, name: &str, ignore_missing: bool) -> Result<()> {
        let mut state = self.lock();
        let recorded = state.record(format!("branch -D {name}"));
        let removed = state.branches.remove(name).is_some();
        state.last_commits.remove(name);
        match recorded {
            Err(_) | Ok(()) if ignore_missing => Ok(()),
            Err(err) => Err(err),
            Ok(()) if removed => Ok(()),
            Ok(()) => Err(Error::git(&["branch", "-D", name], "branch not found", "")),
        }
    }

    fn checkout(&self, name: &str, force: bool) -> Result<()> {
        let mut state = self.lock();
        let flag = if force { "-f " } else { "" };
        state.record(format!("checkout {flag}{name}"))?;
        if !state.branches.contains_key(name) {
            return Err(Error::git(&["checkout", name], "pathspec did not match", ""));
        }
        state.head = name.to_string();
        state.staged.clear();
        Ok(())
    }

    fn reset_index_to(&self, reference: &str) -> Result<()> {
        let mut state = self.lock();
        state.record(format!("reset {reference}"))?;
        state.staged.clear();
        Ok(())
    }

    fn stage(&self, paths: &[String]) -> Result<()> {
        let mut state = self.lock();
        state.record(format!("add {}", paths.join(" ")))?;
        state.staged.extend(paths.iter().cloned());
        Ok(())
    }

    fn commit(&self, message: &str, skip_hooks: bool) -> Result<()> {
        let mut state = self.lock();
        let flag = if skip_hooks { " --no-verify" } else { "" };
        state.record(format!("commit{flag}"))?;
        let head = state.head.clone();
        let record = CommitRecord {
            message: message.to_string(),
            files: std::mem::take(&mut state.staged),
            skipped_hooks: skip_hooks,
        };
        let time = state.commit_time;
        state.branches.insert(head.clone(), time);
        state.last_commits.insert(head, record);
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str, force: bool) -> Result<()> {
        let mut state = self.lock();
        let flag = if force { "-f " } else { "" };
        state.record(format!("push {flag}-u {remote} {branch}"))?;
        let tip = state.branches.get(branch).copied().ok_or_else(|| {
            Error::git(&["push", remote, branch], "src refspec does not match", "")
        })?;
        state.remote_branches.insert(format!("{remote}/{branch}"), tip);
        Ok(())
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        Ok(self.lock().branches.keys().cloned().collect())
    }

    fn last_commit_time(&self, reference: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.lock().time_of(reference))
    }
}
