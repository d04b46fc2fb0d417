//! `erised mirror` command.

use crate::context::ServiceContext;
use crate::mirror;

/// Execute the `mirror` command against the working copy in the current
/// directory.
///
/// # Errors
///
/// Returns an error string if the repository cannot be loaded or mirroring
/// fails.
pub fn run() -> Result<(), String> {
    let ctx = ServiceContext::local().map_err(|e| e.to_string())?;
    run_with_context(&ctx)
}

/// Execute the `mirror` command with the given service context.
///
/// # Errors
///
/// Returns an error string if the repository cannot be loaded or mirroring
/// fails.
pub fn run_with_context(ctx: &ServiceContext) -> Result<(), String> {
    let (repo, preferences) = super::load(ctx)?;
    let report =
        mirror::mirror(ctx.git.as_ref(), &repo, &preferences.rules()).map_err(|e| e.to_string())?;

    if report.mirrored.is_empty() {
        println!("No changes since {} to mirror.", repo.main_branch);
        return Ok(());
    }
    for mirrored in &report.mirrored {
        println!(
            "{} ({} file(s)) -> {}",
            mirrored.boundary.name,
            mirrored.boundary.changed_files.len(),
            mirrored.branch
        );
    }
    Ok(())
}
