//! Mirroring: one freshly rebuilt branch per boundary.
//!
//! Every run deletes and recreates each mirrored branch from the current
//! branch, so the result depends only on the current source state. A
//! mirrored branch always holds exactly one commit on top of the main
//! branch, carrying the message of the first commit made on the source
//! branch.

use tracing::info;

use crate::boundary::{Boundary, BoundaryRules};
use crate::changeset;
use crate::context::RepoContext;
use crate::error::Result;
use crate::ports::git::GitRepo;

/// A boundary and the branch it was mirrored to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredBoundary {
    /// The boundary that was mirrored.
    pub boundary: Boundary,
    /// The branch now holding its single commit.
    pub branch: String,
}

/// Outcome of a mirror run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    /// Message committed on every mirrored branch.
    pub message: String,
    /// Mirrored boundaries in name order.
    pub mirrored: Vec<MirroredBoundary>,
}

/// (Re)creates one branch per boundary of the current changes.
///
/// Aborts before touching any branch when the working tree is dirty. A
/// failure part-way leaves earlier boundaries mirrored; re-running rebuilds
/// them all.
///
/// # Errors
///
/// Returns an error on a dirty tree, unrelated histories, a branch without
/// commits, or any failing branch, stage or commit operation.
pub fn mirror(
    git: &dyn GitRepo,
    repo: &RepoContext,
    rules: &BoundaryRules,
) -> Result<MirrorReport> {
    changeset::assert_clean_working_tree(git)?;

    let boundaries = changeset::current_boundaries(git, repo, rules)?;
    let message = changeset::propagated_message(git, repo)?;
    info!(count = boundaries.len(), "mirroring boundaries");

    let mut mirrored = Vec::with_capacity(boundaries.len());
    for boundary in boundaries {
        let branch = boundary.branch_name(&repo.current_branch);
        mirror_boundary(git, repo, &boundary, &branch, &message)?;
        mirrored.push(MirroredBoundary { boundary, branch });
    }

    git.checkout(&repo.current_branch, true)?;
    Ok(MirrorReport { message, mirrored })
}

fn mirror_boundary(
    git: &dyn GitRepo,
    repo: &RepoContext,
    boundary: &Boundary,
    branch: &str,
    message: &str,
) -> Result<()> {
    info!(%branch, files = boundary.changed_files.len(), "mirroring {}", boundary.name);

    git.checkout(&repo.current_branch, true)?;
    git.delete_branch(branch, true)?;
    git.create_branch(branch)?;

    git.reset_index_to(&repo.main_branch)?;
    git.stage(&boundary.changed_files)?;
    git.commit(message, true)
}
