//! Crypto error types.

use thiserror::Error;

/// Errors raised by signature algorithms and key handling.
///
/// Everything here is recoverable: callers decoding untrusted bytes drop the
/// input and move on.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key material does not have the algorithm's declared length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Signature does not have the algorithm's declared length
    #[error("Invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength {
        /// Expected signature length in bytes
        expected: usize,
        /// Actual signature length in bytes
        actual: usize,
    },

    /// Signed digests are always 32 bytes
    #[error("Invalid digest length: expected 32, got {0}")]
    InvalidDigestLength(usize),

    /// Invalid public key (all-zero sentinel or rejected by the primitive)
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Secret and public halves of a stored key do not belong together
    #[error("Private key does not match its public key")]
    KeyPairMismatch,

    /// Algorithm declares an address offset that runs past the hash
    #[error("Address offset {0} leaves fewer than 20 hash bytes")]
    AddressOffsetOutOfRange(usize),

    /// Length framing of a combined signature is inconsistent
    #[error("Malformed combined signature")]
    MalformedCombinedSignature,

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Hex input could not be decoded
    #[error("Invalid hex data: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Key file ended before a full key was read
    #[error("Key file too short, want {expected} hex characters")]
    KeyFileTooShort {
        /// Number of hex characters required
        expected: usize,
    },

    /// Key file has more than two trailing newline bytes
    #[error("Key file too long, want {expected} hex characters")]
    KeyFileTooLong {
        /// Number of hex characters required
        expected: usize,
    },

    /// Key file has a non-newline byte after the key
    #[error("Invalid character {0:?} at end of key file")]
    KeyFileInvalidTrailer(char),

    /// Underlying file I/O failed
    #[error("Key file I/O: {0}")]
    Io(#[from] std::io::Error),
}
