//! # Key and Signature Containers
//!
//! Algorithm-agnostic byte containers. Their lengths are whatever the owning
//! [`SignatureAlgorithm`](crate::SignatureAlgorithm) declares; the containers
//! themselves never interpret the bytes.

use std::fmt;
use zeroize::Zeroize;

/// Opaque public key bytes.
///
/// Construct from untrusted input through
/// [`SignatureAlgorithm::deserialize_public_key`](crate::SignatureAlgorithm::deserialize_public_key),
/// which checks the length and rejects the all-zero sentinel.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    data: Vec<u8>,
}

impl PublicKey {
    /// Wrap raw bytes without validation.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the key holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when every byte is zero (the invalid sentinel).
    pub fn is_all_zero(&self) -> bool {
        is_all_zero(&self.data)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = &self.data[..self.data.len().min(8)];
        write!(f, "PublicKey({}.., {} bytes)", hex::encode(head), self.data.len())
    }
}

/// Secret key material plus the matching public key.
///
/// The secret bytes are overwritten with zeros when the key is dropped, and
/// can be wiped earlier with [`Zeroize::zeroize`]. Wiping keeps the length so
/// a wiped key still fails loudly rather than being mistaken for a short one.
pub struct PrivateKey {
    secret: Vec<u8>,
    public_key: PublicKey,
}

impl PrivateKey {
    /// Assemble a private key from its secret bytes and public half.
    pub fn new(secret: Vec<u8>, public_key: PublicKey) -> Self {
        Self { secret, public_key }
    }

    /// Secret bytes (for serialization and signing only).
    pub fn secret_bytes(&self) -> &[u8] {
        &self.secret
    }

    /// The embedded public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// True once the secret has been wiped.
    pub fn is_zeroized(&self) -> bool {
        is_all_zero(&self.secret)
    }
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        self.secret.as_mut_slice().zeroize();
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("secret", &"<redacted>")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Detached signature bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    data: Vec<u8>,
}

impl Signature {
    /// Wrap raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume into raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the signature holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({} bytes)", self.data.len())
    }
}

pub(crate) fn is_all_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b == 0)
}
