//! QC-Bootnode: Discovery v4 bootstrap node
//!
//! A developer tool that owns a node key, prints its enode URL and answers
//! discovery pings so other nodes can learn their external endpoint.
//!
//! - `cli` - flags, key selection, config merging
//! - `identity` - enode URL, address and node ID output
//! - `responder` - per-datagram handling and the UDP receive loop

pub mod cli;
pub mod identity;
pub mod responder;
