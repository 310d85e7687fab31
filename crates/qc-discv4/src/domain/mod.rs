//! Domain Layer - Pure types with no I/O
//!
//! - Node identifiers, wire IP addresses, timestamps
//! - Decode/encode error taxonomy

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
