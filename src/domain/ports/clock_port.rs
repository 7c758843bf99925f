//! Time source port.

use chrono::{DateTime, Utc};

/// Port for reading the current time.
pub trait ClockPort: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}
