//! `erised cleanup` command.

use crate::cleanup;
use crate::cli::GitHubArgs;
use crate::context::ServiceContext;

/// Execute the `cleanup` command against the working copy in the current
/// directory.
///
/// # Errors
///
/// Returns an error string if no token was given, a lookup fails or a branch
/// cannot be deleted.
pub fn run(args: &GitHubArgs) -> Result<(), String> {
    let config = args.config().map_err(|e| e.to_string())?;
    let ctx = ServiceContext::live(config).map_err(|e| e.to_string())?;
    run_with_context(&ctx)
}

/// Execute the `cleanup` command with the given service context.
///
/// # Errors
///
/// Returns an error string if a lookup fails or a branch cannot be deleted.
pub fn run_with_context(ctx: &ServiceContext) -> Result<(), String> {
    let (repo, preferences) = super::load(ctx)?;
    let report = super::block_on(cleanup::cleanup(
        ctx.git.as_ref(),
        ctx.host.as_ref(),
        &repo,
        &preferences.rules(),
    ))?
    .map_err(|e| e.to_string())?;

    for number in &report.closed_pull_requests {
        println!("Closed pull request #{number}");
    }
    for (branch, reason) in &report.deleted {
        println!("Deleted {branch} ({reason})");
    }
    let (deleted, kept) = (report.deleted.len(), report.kept.len());
    println!("{deleted} branch(es) deleted, {kept} kept.");
    Ok(())
}
