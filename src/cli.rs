//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use crate::adapters::live::{GitHubConfig, DEFAULT_API_BASE};
use crate::error::Error;

/// Top-level CLI parser for `erised`.
#[derive(Debug, Parser)]
#[command(
    name = "erised",
    version,
    about = "Mirror a working branch into one branch and pull request per boundary"
)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rebuild one single-commit branch per changed boundary.
    Mirror,
    /// Push mirrored branches and open a pull request for each.
    Upload(GitHubArgs),
    /// Show local, remote and review state of every boundary.
    Status(GitHubArgs),
    /// Delete mirrored branches that were merged or no longer match a boundary.
    Cleanup(GitHubArgs),
}

/// Options shared by commands that talk to GitHub.
#[derive(Debug, Clone, Args)]
pub struct GitHubArgs {
    /// GitHub API base URL.
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub github_api_base: String,

    /// GitHub token with pull request access.
    #[arg(short = 't', long, env = "ERISED_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,
}

impl GitHubArgs {
    /// Connection settings for the live GitHub adapter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingToken`] when no token was given.
    pub fn config(&self) -> Result<GitHubConfig, Error> {
        let token = self.github_token.clone().ok_or(Error::MissingToken)?;
        Ok(GitHubConfig {
            api_base: self.github_api_base.clone(),
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mirror_subcommand() {
        let cli = Cli::parse_from(["erised", "mirror"]);
        assert!(matches!(cli.command, Command::Mirror));
    }

    #[test]
    fn parses_github_options() {
        let cli = Cli::parse_from([
            "erised",
            "upload",
            "-t",
            "secret",
            "--github-api-base",
            "http://127.0.0.1:9000",
        ]);
        let Command::Upload(args) = cli.command else {
            panic!("expected upload");
        };
        let config = args.config().unwrap();
        assert_eq!(config.token, "secret");
        assert_eq!(config.api_base, "http://127.0.0.1:9000");
    }

    #[test]
    fn api_base_defaults_to_public_github() {
        let cli = Cli::parse_from(["erised", "status", "--github-token", "secret"]);
        let Command::Status(args) = cli.command else {
            panic!("expected status");
        };
        assert_eq!(args.github_api_base, "https://api.github.com");
    }

    #[test]
    fn missing_token_is_reported() {
        let args = GitHubArgs {
            github_api_base: DEFAULT_API_BASE.to_string(),
            github_token: None,
        };
        assert!(matches!(args.config(), Err(Error::MissingToken)));
    }
}
