//! # Ed25519 Signatures
//!
//! Classic-only scheme behind the same [`SignatureAlgorithm`] seam as the
//! hybrid one. Useful for local networks and for exercising codecs with a
//! second, much smaller set of lengths.
//!
//! ## Security Properties
//!
//! - Deterministic nonces (no RNG needed when signing)
//! - Strict verification (rejects malleable and small-order encodings)

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use zeroize::Zeroize;

use crate::algorithm::SignatureAlgorithm;
use crate::CryptoError;

const PUBLIC_KEY_LENGTH: usize = 32;
const SECRET_KEY_LENGTH: usize = 32;
const SIGNATURE_LENGTH: usize = 64;

/// Plain Ed25519.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Sig;

impl Ed25519Sig {
    /// Registry name.
    pub const NAME: &'static str = "ed25519";

    /// Create the algorithm.
    pub fn new() -> Self {
        Self
    }
}

impl SignatureAlgorithm for Ed25519Sig {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn public_key_length(&self) -> usize {
        PUBLIC_KEY_LENGTH
    }

    fn secret_key_length(&self) -> usize {
        SECRET_KEY_LENGTH
    }

    fn signature_length(&self) -> usize {
        SIGNATURE_LENGTH
    }

    fn address_offset(&self) -> usize {
        12
    }

    fn generate_raw(&self) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        let mut seed = signing_key.to_bytes();
        let secret = seed.to_vec();
        seed.zeroize();
        Ok((signing_key.verifying_key().to_bytes().to_vec(), secret))
    }

    fn sign_raw(&self, secret: &[u8], digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut seed: [u8; SECRET_KEY_LENGTH] =
            secret
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: SECRET_KEY_LENGTH,
                    actual: secret.len(),
                })?;
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();

        Ok(signing_key.sign(digest).to_bytes().to_vec())
    }

    fn verify_raw(
        &self,
        digest: &[u8],
        signature: &[u8],
        public: &[u8],
    ) -> Result<(), CryptoError> {
        let public: [u8; PUBLIC_KEY_LENGTH] =
            public
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: PUBLIC_KEY_LENGTH,
                    actual: public.len(),
                })?;
        let signature: [u8; SIGNATURE_LENGTH] =
            signature
                .try_into()
                .map_err(|_| CryptoError::InvalidSignatureLength {
                    expected: SIGNATURE_LENGTH,
                    actual: signature.len(),
                })?;

        let verifying_key =
            VerifyingKey::from_bytes(&public).map_err(|_| CryptoError::InvalidPublicKey)?;

        verifying_key
            .verify_strict(digest, &ed25519_dalek::Signature::from_bytes(&signature))
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::keccak256;

    #[test]
    fn test_sign_verify() {
        let alg = Ed25519Sig::new();
        let key = alg.generate_key().unwrap();
        let digest = keccak256(b"Hello, Ed25519!");

        let signature = alg.sign(&digest, &key).unwrap();
        assert!(alg.verify(&digest, &signature, key.public_key()).is_ok());
    }

    #[test]
    fn test_wrong_digest_fails() {
        let alg = Ed25519Sig::new();
        let key = alg.generate_key().unwrap();

        let signature = alg.sign(&keccak256(b"message1"), &key).unwrap();
        let result = alg.verify(&keccak256(b"message2"), &signature, key.public_key());

        assert!(matches!(result, Err(CryptoError::SignatureVerificationFailed)));
    }

    #[test]
    fn test_wrong_key_fails() {
        let alg = Ed25519Sig::new();
        let key1 = alg.generate_key().unwrap();
        let key2 = alg.generate_key().unwrap();
        let digest = keccak256(b"test");

        let signature = alg.sign(&digest, &key1).unwrap();
        assert!(alg.verify(&digest, &signature, key2.public_key()).is_err());
    }

    #[test]
    fn test_deterministic_signatures() {
        let alg = Ed25519Sig::new();
        let key = alg.generate_key().unwrap();
        let digest = keccak256(b"deterministic test");

        let sig1 = alg.sign(&digest, &key).unwrap();
        let sig2 = alg.sign(&digest, &key).unwrap();

        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_roundtrip_serialized_key() {
        let alg = Ed25519Sig::new();
        let original = alg.generate_key().unwrap();

        let bytes = alg.serialize_private_key(&original).unwrap();
        assert_eq!(bytes.len(), 64);

        let restored = alg.deserialize_private_key(&bytes).unwrap();
        assert_eq!(original.public_key(), restored.public_key());
        assert_eq!(original.secret_bytes(), restored.secret_bytes());
    }
}
