//! `erised upload` command.

use crate::cli::GitHubArgs;
use crate::context::ServiceContext;
use crate::upload;

/// Execute the `upload` command against the working copy in the current
/// directory.
///
/// # Errors
///
/// Returns an error string if no token was given, or if pushing or opening a
/// pull request fails.
pub fn run(args: &GitHubArgs) -> Result<(), String> {
    let config = args.config().map_err(|e| e.to_string())?;
    let ctx = ServiceContext::live(config).map_err(|e| e.to_string())?;
    run_with_context(&ctx)
}

/// Execute the `upload` command with the given service context.
///
/// # Errors
///
/// Returns an error string if pushing or opening a pull request fails.
pub fn run_with_context(ctx: &ServiceContext) -> Result<(), String> {
    let (repo, _) = super::load(ctx)?;
    let uploaded = super::block_on(upload::upload(ctx.git.as_ref(), ctx.host.as_ref(), &repo))?
        .map_err(|e| e.to_string())?;

    if uploaded.is_empty() {
        println!("No mirrored branches to upload. Run `erised mirror` first.");
    }
    for branch in &uploaded {
        let verb = if branch.created { "opened" } else { "exists" };
        println!("{} {verb}: {}", branch.branch, branch.pull_request_url);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{FixedClock, MemoryCodeHost, MemoryGitRepo};
    use chrono::Utc;

    #[test]
    fn uploads_mirrored_branches() {
        let git = MemoryGitRepo::new("feat")
            .with_remote_url("origin", "git@github.com:acme/widgets.git")
            .with_branch("feat.erised.packages_foo", Utc::now())
            .with_commits(&[("c1", "feat: foo")]);
        let ctx = ServiceContext {
            git: Box::new(git),
            host: Box::new(MemoryCodeHost::new()),
            clock: Box::new(FixedClock(Utc::now())),
        };

        assert!(run_with_context(&ctx).is_ok());
    }
}
