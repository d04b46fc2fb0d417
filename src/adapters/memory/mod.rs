//! In-memory adapters substituted for git, GitHub and the clock in tests.

pub mod clock;
pub mod git;
pub mod hosting;

pub use clock::FixedClock;
pub use git::{CommitRecord, MemoryGitRepo};
pub use hosting::{pull_request, MemoryCodeHost};
