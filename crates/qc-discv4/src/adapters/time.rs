//! Clock adapters behind [`TimeSource`].

use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::Timestamp;
use crate::ports::TimeSource;

/// Wall clock in unix seconds. Stamps outgoing packets in production.
///
/// ```rust
/// use qc_discv4::adapters::SystemTimeSource;
/// use qc_discv4::ports::TimeSource;
///
/// assert!(SystemTimeSource::new().now().as_secs() > 0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    /// Create a wall-clock source.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        // A clock set before 1970 reads as the epoch: every packet looks expired
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Timestamp::new(secs)
    }
}

/// Frozen clock, so expiration boundaries can be hit exactly.
///
/// ```rust
/// use qc_discv4::adapters::FixedTimeSource;
/// use qc_discv4::ports::TimeSource;
/// use qc_discv4::expiration_from_now;
///
/// let clock = FixedTimeSource::new(1_000);
/// assert_eq!(expiration_from_now(&clock, 20), 1_020);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    secs: u64,
}

impl FixedTimeSource {
    /// Clock stuck at `secs` unix seconds.
    #[must_use]
    pub fn new(secs: u64) -> Self {
        Self { secs }
    }

    /// The frozen reading.
    pub fn timestamp(&self) -> u64 {
        self.secs
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.secs)
    }
}
