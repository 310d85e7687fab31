//! # Discovery v4 Wire Protocol
//!
//! Signed UDP packet codec for node discovery, parameterized over a
//! pluggable [`SignatureAlgorithm`](qc_crypto::SignatureAlgorithm).
//!
//! ## Packet Envelope
//!
//! ```text
//! hash (32) | u16 len | signature | u16 len | public key | tag (1) | rlp body
//! ```
//!
//! - `hash = keccak256(everything after the hash)` - transport integrity
//! - the signature covers `keccak256(tag ∥ body)` - sender authentication
//! - the sender's public key travels inside the combined signature block, so
//!   no key recovery is needed
//!
//! ## Packet Types
//!
//! | Tag | Packet      | Expires |
//! |-----|-------------|---------|
//! | 1   | Ping        | yes     |
//! | 2   | Pong        | yes     |
//! | 3   | Findnode    | yes     |
//! | 4   | Neighbors   | yes     |
//! | 5   | EnrRequest  | yes     |
//! | 6   | EnrResponse | no      |
//!
//! Unknown trailing list elements are preserved in each packet's `rest`
//! field for forward compatibility.
//!
//! ## Architecture
//!
//! - **Domain Layer:** identifiers, wire IP addresses, timestamps, errors
//! - **Ports Layer:** the injectable clock
//! - **Adapters Layer:** system and fixed clocks
//! - **Wire Layer:** packet types and the [`PacketCodec`]
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use qc_crypto::{Ed25519Sig, SignatureAlgorithm};
//! use qc_discv4::{EnrRequest, Packet, PacketCodec};
//!
//! let alg: Arc<dyn SignatureAlgorithm> = Arc::new(Ed25519Sig::new());
//! let key = alg.generate_key().unwrap();
//! let codec = PacketCodec::new(alg);
//!
//! let packet = Packet::EnrRequest(EnrRequest { expiration: u64::MAX, rest: vec![] });
//! let (bytes, hash) = codec.encode(&key, &packet).unwrap();
//!
//! let decoded = codec.decode(&bytes).unwrap();
//! assert_eq!(decoded.packet, packet);
//! assert_eq!(decoded.hash, hash);
//! assert_eq!(decoded.from.as_bytes(), key.public_key().as_bytes());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod node;
pub mod ports;
pub mod wire;

// Domain
pub use domain::{DiscoveryError, ErrorKind, IpAddr, NodeId, Timestamp};

// Ports and adapters
pub use adapters::{FixedTimeSource, SystemTimeSource};
pub use ports::TimeSource;

// Configuration
pub use config::{ConfigError, DiscoveryConfig};

// Node identity
pub use node::{unwrap_node, unwrap_nodes, wrap_node, wrap_nodes, Node, TableNode};

// Wire
pub use wire::{
    decode_pubkey, encode_pubkey, expiration_from_now, expired, expired_at, DecodedPacket,
    EnrRequest, EnrResponse, Endpoint, Findnode, Neighbors, Packet, PacketCodec, PacketKind, Ping,
    Pong, Pubkey, MAC_SIZE, MAX_NEIGHBORS, MAX_PACKET_SIZE, PROTOCOL_VERSION,
};
