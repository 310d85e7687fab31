//! # QC Crypto - Pluggable Signature Algorithms
//!
//! Key material, signatures and the combined signature framing used on the
//! discovery wire, written against a swappable [`SignatureAlgorithm`].
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `algorithm` | trait + registry | Scheme-agnostic key/signature contract |
//! | `hybrid` | Ed25519 + Falcon-512 | Default node identity scheme |
//! | `ed25519` | Ed25519 | Classic-only scheme |
//! | `framing` | length-prefixed | Signature + public key on the wire |
//! | `key_codec` | hex | Key files and CLI key input |
//! | `hashing` | Keccak-256 | Digests, node IDs, addresses |
//!
//! ## Security Properties
//!
//! - **Hybrid**: both halves must verify; strict Ed25519 verification
//! - **Zeroize**: private keys wipe their secret bytes on drop
//! - **Framing**: every byte of a combined signature is accounted for
//!
//! ## Example
//!
//! ```rust
//! use qc_crypto::{algorithm_by_name, keccak256, Ed25519Sig};
//!
//! let alg = algorithm_by_name(Ed25519Sig::NAME).unwrap();
//! let key = alg.generate_key().unwrap();
//! let digest = keccak256(b"ping");
//!
//! let combined = alg.sign_combined(&digest, &key).unwrap();
//! let sender = alg.public_key_from_signature(&digest, &combined).unwrap();
//! assert_eq!(&sender, key.public_key());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithm;
pub mod ed25519;
pub mod errors;
pub mod framing;
pub mod hashing;
pub mod hybrid;
pub mod key_codec;
pub mod keys;

// Re-exports
pub use algorithm::{algorithm_by_name, default_algorithm, SignatureAlgorithm, ALGORITHM_NAMES};
pub use ed25519::Ed25519Sig;
pub use errors::CryptoError;
pub use framing::{combine_two_parts, extract_two_parts, LENGTH_FIELD_SIZE};
pub use hashing::{keccak256, keccak256_many, Address, Hash, Keccak256Hasher, HASH_LENGTH};
pub use hybrid::HybridSig;
pub use key_codec::KeyCodec;
pub use keys::{PrivateKey, PublicKey, Signature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
