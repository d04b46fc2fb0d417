//! Clock frozen at a single instant.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// Clock that always returns the same time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
