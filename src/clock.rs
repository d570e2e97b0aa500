use chrono::{DateTime, Utc};

use tally_core::Clock;

/// Wall-clock time for commands run without `--now`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
