//! # Pluggable Signature Algorithm
//!
//! Every wire format in the node is written against the lengths an algorithm
//! declares here, never against a concrete scheme. Swapping schemes means
//! implementing the four primitive methods plus the length accessors; the
//! serialization, framing and address rules come with the trait.
//!
//! ## Layout conventions
//!
//! - Serialized private key: `secret ∥ public` (`private_key_length()` bytes)
//! - Combined signature: see [`crate::framing`]
//! - Address: `keccak256(public)[address_offset()..][..20]`

use std::fmt;
use std::sync::Arc;

use tracing::debug;
use zeroize::Zeroize;

use crate::ed25519::Ed25519Sig;
use crate::framing::{combine_two_parts, extract_two_parts, LENGTH_FIELD_SIZE};
use crate::hashing::{keccak256, Address, HASH_LENGTH};
use crate::hybrid::HybridSig;
use crate::keys::{is_all_zero, PrivateKey, PublicKey, Signature};
use crate::CryptoError;

/// Capability set every signature scheme must provide.
///
/// Implementations must be stateless and thread-safe: one instance is chosen
/// at startup and shared behind an `Arc` by every codec.
pub trait SignatureAlgorithm: Send + Sync + fmt::Debug {
    // =========================================================================
    // Declared properties
    // =========================================================================

    /// Stable algorithm name (used for selection at startup).
    fn name(&self) -> &'static str;

    /// Serialized public key length.
    fn public_key_length(&self) -> usize;

    /// Length of the secret part of a private key.
    fn secret_key_length(&self) -> usize;

    /// Detached signature length.
    fn signature_length(&self) -> usize;

    /// Offset into `keccak256(public)` where the 20-byte address starts.
    ///
    /// At most `HASH_LENGTH - 20` (12); larger offsets make
    /// [`public_key_to_address`](Self::public_key_to_address) fail.
    fn address_offset(&self) -> usize;

    // =========================================================================
    // Primitive operations
    // =========================================================================

    /// Produce raw `(public, secret)` key bytes.
    fn generate_raw(&self) -> Result<(Vec<u8>, Vec<u8>), CryptoError>;

    /// Sign `digest` with raw secret bytes of `secret_key_length()`.
    fn sign_raw(&self, secret: &[u8], digest: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Verify raw signature bytes against raw public key bytes.
    fn verify_raw(&self, digest: &[u8], signature: &[u8], public: &[u8])
        -> Result<(), CryptoError>;

    // =========================================================================
    // Derived lengths
    // =========================================================================

    /// Serialized private key length (`secret ∥ public`).
    fn private_key_length(&self) -> usize {
        self.secret_key_length() + self.public_key_length()
    }

    /// Length of a combined signature carrying this algorithm's signature
    /// and public key.
    fn signature_with_public_key_length(&self) -> usize {
        self.signature_length() + self.public_key_length() + 2 * LENGTH_FIELD_SIZE
    }

    /// Legacy marker byte for public key slots.
    fn public_key_start_value(&self) -> u8 {
        0x09
    }

    /// Legacy marker byte for signature slots.
    fn signature_start_value(&self) -> u8 {
        0x39
    }

    // =========================================================================
    // Key lifecycle
    // =========================================================================

    /// Generate a fresh keypair.
    ///
    /// # Panics
    ///
    /// Panics if the primitive hands back keys of the wrong length; that is a
    /// broken implementation, not a runtime condition.
    fn generate_key(&self) -> Result<PrivateKey, CryptoError> {
        let (public, secret) = self.generate_raw()?;

        assert!(
            public.len() == self.public_key_length() && secret.len() == self.secret_key_length(),
            "keygen basic check failed"
        );

        Ok(PrivateKey::new(secret, PublicKey::new(public)))
    }

    /// Overwrite the private key's secret bytes with zeros in place.
    fn zeroize(&self, key: &mut PrivateKey) {
        key.zeroize();
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Serialize a private key to `private_key_length()` bytes.
    fn serialize_private_key(&self, key: &PrivateKey) -> Result<Vec<u8>, CryptoError> {
        check_length(key.secret_bytes(), self.secret_key_length())?;
        let public = self.serialize_public_key(key.public_key())?;

        let mut out = Vec::with_capacity(self.private_key_length());
        out.extend_from_slice(key.secret_bytes());
        out.extend_from_slice(&public);
        Ok(out)
    }

    /// Deserialize a private key produced by
    /// [`serialize_private_key`](Self::serialize_private_key).
    ///
    /// The stored public half must verify a signature made with the secret
    /// half, otherwise every packet signed with the key would be rejected
    /// by peers.
    fn deserialize_private_key(&self, bytes: &[u8]) -> Result<PrivateKey, CryptoError> {
        check_length(bytes, self.private_key_length())?;
        let (secret, public) = bytes.split_at(self.secret_key_length());
        let public_key = self.deserialize_public_key(public)?;
        let key = PrivateKey::new(secret.to_vec(), public_key);

        let challenge = keccak256(b"qc-crypto key pair check");
        let signature = self
            .sign(&challenge, &key)
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        self.verify(&challenge, &signature, key.public_key())
            .map_err(|_| CryptoError::KeyPairMismatch)?;
        Ok(key)
    }

    /// Serialize a public key to `public_key_length()` bytes.
    fn serialize_public_key(&self, key: &PublicKey) -> Result<Vec<u8>, CryptoError> {
        check_length(key.as_bytes(), self.public_key_length())?;
        Ok(key.as_bytes().to_vec())
    }

    /// Deserialize a public key, rejecting the all-zero sentinel.
    fn deserialize_public_key(&self, bytes: &[u8]) -> Result<PublicKey, CryptoError> {
        check_length(bytes, self.public_key_length())?;
        if is_all_zero(bytes) {
            return Err(CryptoError::InvalidPublicKey);
        }
        Ok(PublicKey::new(bytes.to_vec()))
    }

    /// Derive the 20-byte address of a public key.
    fn public_key_to_address(&self, key: &PublicKey) -> Result<Address, CryptoError> {
        let public = self.serialize_public_key(key)?;
        let hash = keccak256(&public);
        let start = self.address_offset();

        let tail = start
            .checked_add(20)
            .and_then(|end| hash.get(start..end))
            .ok_or(CryptoError::AddressOffsetOutOfRange(start))?;
        let mut address = [0u8; 20];
        address.copy_from_slice(tail);
        Ok(address)
    }

    // =========================================================================
    // Signing
    // =========================================================================

    /// Sign a 32-byte digest.
    fn sign(&self, digest: &[u8], key: &PrivateKey) -> Result<Signature, CryptoError> {
        check_digest(digest)?;
        check_length(key.secret_bytes(), self.secret_key_length())?;

        let signature = self.sign_raw(key.secret_bytes(), digest)?;
        if signature.len() != self.signature_length() {
            return Err(CryptoError::SigningFailed(format!(
                "primitive produced {} bytes, expected {}",
                signature.len(),
                self.signature_length()
            )));
        }
        Ok(Signature::new(signature))
    }

    /// Verify a detached signature over `digest` against exactly `key`.
    fn verify(
        &self,
        digest: &[u8],
        signature: &Signature,
        key: &PublicKey,
    ) -> Result<(), CryptoError> {
        check_digest(digest)?;
        if signature.len() != self.signature_length() {
            return Err(CryptoError::InvalidSignatureLength {
                expected: self.signature_length(),
                actual: signature.len(),
            });
        }
        check_length(key.as_bytes(), self.public_key_length())?;

        self.verify_raw(digest, signature.as_bytes(), key.as_bytes())
    }

    // =========================================================================
    // Combined signatures
    // =========================================================================

    /// Frame a signature and public key into one combined blob.
    fn combine_public_key_signature(
        &self,
        signature: &Signature,
        key: &PublicKey,
    ) -> Result<Vec<u8>, CryptoError> {
        if signature.len() != self.signature_length() {
            return Err(CryptoError::InvalidSignatureLength {
                expected: self.signature_length(),
                actual: signature.len(),
            });
        }
        check_length(key.as_bytes(), self.public_key_length())?;

        Ok(combine_two_parts(signature.as_bytes(), key.as_bytes()))
    }

    /// Split a combined blob and verify the signature over `digest` with the
    /// bundled key. A key is only returned once it has verified.
    fn public_key_and_signature_from_combined_signature(
        &self,
        digest: &[u8],
        combined: &[u8],
    ) -> Result<(Signature, PublicKey), CryptoError> {
        let (signature, public) = extract_two_parts(combined)?;

        if signature.len() != self.signature_length() {
            return Err(CryptoError::InvalidSignatureLength {
                expected: self.signature_length(),
                actual: signature.len(),
            });
        }
        let key = self.deserialize_public_key(public)?;
        let signature = Signature::new(signature.to_vec());

        self.verify(digest, &signature, &key)?;
        Ok((signature, key))
    }

    /// Verified public key bytes carried by a combined signature.
    fn public_key_bytes_from_signature(
        &self,
        digest: &[u8],
        combined: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let (_, key) = self.public_key_and_signature_from_combined_signature(digest, combined)?;
        self.serialize_public_key(&key)
    }

    /// Verified public key carried by a combined signature.
    fn public_key_from_signature(
        &self,
        digest: &[u8],
        combined: &[u8],
    ) -> Result<PublicKey, CryptoError> {
        self.public_key_and_signature_from_combined_signature(digest, combined)
            .map(|(_, key)| key)
    }

    /// Sign `digest` and bundle the signer's public key.
    fn sign_combined(&self, digest: &[u8], key: &PrivateKey) -> Result<Vec<u8>, CryptoError> {
        let signature = self.sign(digest, key)?;
        self.combine_public_key_signature(&signature, key.public_key())
    }

    /// Check a combined signature was made over `digest` by exactly `key`.
    fn verify_combined(&self, key: &PublicKey, digest: &[u8], combined: &[u8]) -> bool {
        let Ok((signature, public)) = extract_two_parts(combined) else {
            return false;
        };
        if public != key.as_bytes() {
            return false;
        }
        self.verify(digest, &Signature::new(signature.to_vec()), key)
            .is_ok()
    }

    /// Structural check for legacy `(v, r, s)` signature slots.
    ///
    /// `r` carries the public key and `s` the signature in this encoding.
    fn validate_signature_values(&self, v: u8, r: &[u8], s: &[u8], _homestead: bool) -> bool {
        if v != 0 && v != 1 {
            return false;
        }
        if r.len() != self.public_key_length() {
            debug!(
                r_len = r.len(),
                expected = self.public_key_length(),
                "signature values: public key slot has wrong length"
            );
            return false;
        }
        if s.len() < self.signature_length() {
            debug!(
                s_len = s.len(),
                expected = self.signature_length(),
                "signature values: signature slot too short"
            );
            return false;
        }
        true
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Names accepted by [`algorithm_by_name`].
pub const ALGORITHM_NAMES: [&str; 2] = [HybridSig::NAME, Ed25519Sig::NAME];

/// Look up an algorithm by its [`SignatureAlgorithm::name`].
pub fn algorithm_by_name(name: &str) -> Option<Arc<dyn SignatureAlgorithm>> {
    match name {
        HybridSig::NAME => Some(Arc::new(HybridSig::new())),
        Ed25519Sig::NAME => Some(Arc::new(Ed25519Sig::new())),
        _ => None,
    }
}

/// The network's default scheme (hybrid Ed25519 + Falcon-512).
pub fn default_algorithm() -> Arc<dyn SignatureAlgorithm> {
    Arc::new(HybridSig::new())
}

// =============================================================================
// HELPERS
// =============================================================================

fn check_length(bytes: &[u8], expected: usize) -> Result<(), CryptoError> {
    if bytes.len() != expected {
        return Err(CryptoError::InvalidKeyLength {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn check_digest(digest: &[u8]) -> Result<(), CryptoError> {
    if digest.len() != HASH_LENGTH {
        return Err(CryptoError::InvalidDigestLength(digest.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_all_names() {
        for name in ALGORITHM_NAMES {
            let alg = algorithm_by_name(name).unwrap();
            assert_eq!(alg.name(), name);
        }
        assert!(algorithm_by_name("secp256k1").is_none());
    }

    #[test]
    fn test_default_is_hybrid() {
        assert_eq!(default_algorithm().name(), HybridSig::NAME);
    }

    #[test]
    fn test_signature_with_public_key_length() {
        let alg = Ed25519Sig::new();
        assert_eq!(alg.signature_with_public_key_length(), 64 + 32 + 4);
    }

    #[test]
    fn test_validate_signature_values() {
        let alg = Ed25519Sig::new();
        let r = vec![1u8; alg.public_key_length()];
        let s = vec![1u8; alg.signature_length()];

        assert!(alg.validate_signature_values(0, &r, &s, true));
        assert!(alg.validate_signature_values(1, &r, &s, false));
        assert!(!alg.validate_signature_values(2, &r, &s, true));
        assert!(!alg.validate_signature_values(27, &r, &s, true));
        assert!(!alg.validate_signature_values(0, &r[1..], &s, true));
        assert!(!alg.validate_signature_values(0, &r, &s[1..], true));
        assert!(!alg.validate_signature_values(0, &[], &[], true));
    }

    #[test]
    fn test_marker_bytes() {
        let alg = Ed25519Sig::new();
        assert_eq!(alg.public_key_start_value(), 0x09);
        assert_eq!(alg.signature_start_value(), 0x39);
    }

    #[test]
    fn test_digest_length_enforced() {
        let alg = Ed25519Sig::new();
        let key = alg.generate_key().unwrap();
        assert!(matches!(
            alg.sign(&[0u8; 31], &key),
            Err(CryptoError::InvalidDigestLength(31))
        ));
    }
}
