//! `erised status` command.

use crate::cli::GitHubArgs;
use crate::context::ServiceContext;
use crate::status;

/// Execute the `status` command against the working copy in the current
/// directory.
///
/// Prints one row per boundary with the local, remote and review state and
/// the pull request (or compare) URL.
///
/// # Errors
///
/// Returns an error string if no token was given or a lookup fails.
pub fn run(args: &GitHubArgs) -> Result<(), String> {
    let config = args.config().map_err(|e| e.to_string())?;
    let ctx = ServiceContext::live(config).map_err(|e| e.to_string())?;
    run_with_context(&ctx)
}

/// Execute the `status` command with the given service context.
///
/// # Errors
///
/// Returns an error string if a git or GitHub lookup fails.
pub fn run_with_context(ctx: &ServiceContext) -> Result<(), String> {
    let (repo, preferences) = super::load(ctx)?;
    let rows = super::block_on(status::status(
        ctx.git.as_ref(),
        ctx.host.as_ref(),
        ctx.clock.as_ref(),
        &repo,
        &preferences.rules(),
    ))?
    .map_err(|e| e.to_string())?;

    print!("{}", status::render_status(&rows));
    Ok(())
}
