//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the orchestrators and an
//! external system (git, the code host, time). Implementations live in
//! `src/adapters/`.

pub mod clock;
pub mod git;
pub mod hosting;

pub use clock::Clock;
pub use git::GitRepo;
pub use hosting::{
    CodeHost, HostFuture, NewPullRequest, PullRequest, PullRequestRef, PullRequestState, Review,
    ReviewState,
};
