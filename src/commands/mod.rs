//! Command dispatch and handlers.

pub mod cleanup;
pub mod mirror;
pub mod status;
pub mod upload;

use std::future::Future;

use tracing::debug;

use crate::cli::Command;
use crate::context::{RepoContext, ServiceContext};
use crate::preferences::Preferences;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Mirror => mirror::run(),
        Command::Upload(args) => upload::run(args),
        Command::Status(args) => status::run(args),
        Command::Cleanup(args) => cleanup::run(args),
    }
}

/// Repository state and preferences for the working copy behind `ctx`.
fn load(ctx: &ServiceContext) -> Result<(RepoContext, Preferences), String> {
    let root = ctx.git.root().map_err(|e| e.to_string())?;
    let preferences = Preferences::load(&root).map_err(|e| e.to_string())?;
    let repo =
        RepoContext::load(ctx.git.as_ref(), &preferences.remote).map_err(|e| e.to_string())?;
    debug!(?preferences, "loaded preferences");
    Ok((repo, preferences))
}

/// Runs `future` to completion on a current-thread runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    Ok(runtime.block_on(future))
}
