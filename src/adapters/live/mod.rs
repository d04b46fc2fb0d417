//! Live adapters for real external interactions.

pub mod clock;
pub mod git;
pub mod github;

pub use clock::LiveClock;
pub use git::LiveGitRepo;
pub use github::{GitHubClient, GitHubConfig, DEFAULT_API_BASE};
