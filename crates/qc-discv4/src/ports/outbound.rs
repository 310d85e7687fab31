//! # Driven Ports (Outbound SPI)

use crate::domain::Timestamp;

/// Clock consulted when stamping and checking packet expirations.
///
/// [`crate::SystemTimeSource`] reads the wall clock; [`crate::FixedTimeSource`]
/// pins it so a test can land exactly on an expiration boundary.
pub trait TimeSource: Send + Sync {
    /// Current unix time.
    fn now(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
