//! Wall clock.

use chrono::{DateTime, Utc};

use crate::domain::ports::ClockPort;

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
