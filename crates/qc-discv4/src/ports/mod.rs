//! # Ports Layer
//!
//! Driven ports this crate requires from the host. Only time is needed: the
//! codec is otherwise a pure transform.

pub mod outbound;

pub use outbound::TimeSource;
