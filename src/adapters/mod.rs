//! Port implementations.
//!
//! `live` talks to the real `git` binary, GitHub and the system clock;
//! `memory` keeps scripted state in memory for tests.

pub mod live;
pub mod memory;
