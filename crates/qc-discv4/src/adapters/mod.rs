//! # Adapters
//!
//! Concrete implementations of the driven ports.
//!
//! - `SystemTimeSource` - Production time source using the system clock
//! - `FixedTimeSource` - Frozen clock for deterministic expiration checks

/// Time source adapters
pub mod time;

pub use time::{FixedTimeSource, SystemTimeSource};
