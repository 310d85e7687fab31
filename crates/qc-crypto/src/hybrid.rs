//! # Hybrid Signatures (Ed25519 + Falcon-512)
//!
//! A hybrid signature only verifies if both the classic and the post-quantum
//! halves verify, so it stays sound as long as either scheme is unbroken.
//!
//! ## Byte Layout
//!
//! ```text
//! public    = ed25519_pk (32)   ∥ falcon_pk
//! secret    = ed25519_seed (32) ∥ falcon_sk
//! signature = ed25519_sig (64)  ∥ u16_be(n) ∥ falcon_sig[..n] ∥ 0x00 padding
//! ```
//!
//! Falcon signatures vary in length, so the Falcon half is padded to the
//! scheme's maximum. Padding must be zero; anything else is rejected to keep
//! signatures non-malleable.
//!
//! The lattice math itself comes from `pqcrypto-falcon` (PQClean).
//!
//! ## Secret hygiene
//!
//! `falcon512::SecretKey` neither implements `Zeroize` nor wipes itself on
//! drop, and exposes no mutable access. The Falcon secret is therefore held
//! in the caller's zeroizing buffer, and the library copy is dropped as soon
//! as it has been used; its stack bytes are not overwritten.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use pqcrypto_falcon::falcon512;
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};
use zeroize::Zeroize;

use crate::algorithm::SignatureAlgorithm;
use crate::CryptoError;

const ED25519_PUBLIC_KEY_LENGTH: usize = 32;
const ED25519_SEED_LENGTH: usize = 32;
const ED25519_SIGNATURE_LENGTH: usize = 64;
const FALCON_LENGTH_PREFIX: usize = 2;

/// Hybrid Ed25519 + Falcon-512 signature algorithm.
#[derive(Debug, Clone)]
pub struct HybridSig {
    sig_name: &'static str,
    public_key_bytes_index_start: usize,
    public_key_length: usize,
    secret_key_length: usize,
    signature_length: usize,
    falcon_signature_max: usize,
}

impl HybridSig {
    /// Registry name.
    pub const NAME: &'static str = "hybrid-ed25519-falcon512";

    /// Create the algorithm with lengths taken from the primitives.
    pub fn new() -> Self {
        let falcon_signature_max = falcon512::signature_bytes();
        Self {
            sig_name: Self::NAME,
            public_key_bytes_index_start: 12,
            public_key_length: ED25519_PUBLIC_KEY_LENGTH + falcon512::public_key_bytes(),
            secret_key_length: ED25519_SEED_LENGTH + falcon512::secret_key_bytes(),
            signature_length: ED25519_SIGNATURE_LENGTH + FALCON_LENGTH_PREFIX + falcon_signature_max,
            falcon_signature_max,
        }
    }

    fn signing_key(secret: &[u8]) -> SigningKey {
        let mut seed = [0u8; ED25519_SEED_LENGTH];
        seed.copy_from_slice(&secret[..ED25519_SEED_LENGTH]);
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();
        signing_key
    }
}

impl Default for HybridSig {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureAlgorithm for HybridSig {
    fn name(&self) -> &'static str {
        self.sig_name
    }

    fn public_key_length(&self) -> usize {
        self.public_key_length
    }

    fn secret_key_length(&self) -> usize {
        self.secret_key_length
    }

    fn signature_length(&self) -> usize {
        self.signature_length
    }

    fn address_offset(&self) -> usize {
        self.public_key_bytes_index_start
    }

    fn generate_raw(&self) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        let (falcon_pk, falcon_sk) = falcon512::keypair();

        let mut seed = signing_key.to_bytes();
        let mut secret = Vec::with_capacity(self.secret_key_length);
        secret.extend_from_slice(&seed);
        secret.extend_from_slice(falcon_sk.as_bytes());
        seed.zeroize();
        drop(falcon_sk);

        let mut public = Vec::with_capacity(self.public_key_length);
        public.extend_from_slice(signing_key.verifying_key().as_bytes());
        public.extend_from_slice(falcon_pk.as_bytes());

        if public.len() != self.public_key_length || secret.len() != self.secret_key_length {
            let err = CryptoError::KeyGenerationFailed(format!(
                "primitive returned {}/{} bytes",
                public.len(),
                secret.len()
            ));
            secret.zeroize();
            return Err(err);
        }
        Ok((public, secret))
    }

    fn sign_raw(&self, secret: &[u8], digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if secret.len() != self.secret_key_length {
            return Err(CryptoError::InvalidKeyLength {
                expected: self.secret_key_length,
                actual: secret.len(),
            });
        }

        let signing_key = Self::signing_key(secret);
        let falcon_sk = falcon512::SecretKey::from_bytes(&secret[ED25519_SEED_LENGTH..])
            .map_err(|_| CryptoError::InvalidPrivateKey)?;

        let ed_sig = signing_key.sign(digest);
        let falcon_sig = falcon512::detached_sign(digest, &falcon_sk);
        drop(falcon_sk);
        let falcon_bytes = falcon_sig.as_bytes();

        // PQClean reports a secret it cannot decode only as an empty signature
        if falcon_bytes.is_empty() {
            return Err(CryptoError::InvalidPrivateKey);
        }
        if falcon_bytes.len() > self.falcon_signature_max {
            return Err(CryptoError::SigningFailed(format!(
                "falcon signature of {} bytes exceeds {}",
                falcon_bytes.len(),
                self.falcon_signature_max
            )));
        }

        let mut out = Vec::with_capacity(self.signature_length);
        out.extend_from_slice(&ed_sig.to_bytes());
        out.extend_from_slice(&(falcon_bytes.len() as u16).to_be_bytes());
        out.extend_from_slice(falcon_bytes);
        out.resize(self.signature_length, 0);
        Ok(out)
    }

    fn verify_raw(
        &self,
        digest: &[u8],
        signature: &[u8],
        public: &[u8],
    ) -> Result<(), CryptoError> {
        if signature.len() != self.signature_length {
            return Err(CryptoError::InvalidSignatureLength {
                expected: self.signature_length,
                actual: signature.len(),
            });
        }
        if public.len() != self.public_key_length {
            return Err(CryptoError::InvalidKeyLength {
                expected: self.public_key_length,
                actual: public.len(),
            });
        }

        // Classic half
        let (ed_public, falcon_public) = public.split_at(ED25519_PUBLIC_KEY_LENGTH);
        let mut ed_public_bytes = [0u8; ED25519_PUBLIC_KEY_LENGTH];
        ed_public_bytes.copy_from_slice(ed_public);
        let verifying_key = VerifyingKey::from_bytes(&ed_public_bytes)
            .map_err(|_| CryptoError::InvalidPublicKey)?;

        let (ed_sig, falcon_part) = signature.split_at(ED25519_SIGNATURE_LENGTH);
        let mut ed_sig_bytes = [0u8; ED25519_SIGNATURE_LENGTH];
        ed_sig_bytes.copy_from_slice(ed_sig);
        verifying_key
            .verify_strict(digest, &ed25519_dalek::Signature::from_bytes(&ed_sig_bytes))
            .map_err(|_| CryptoError::SignatureVerificationFailed)?;

        // Post-quantum half
        let (len_bytes, body) = falcon_part.split_at(FALCON_LENGTH_PREFIX);
        let falcon_len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
        if falcon_len == 0 || falcon_len > self.falcon_signature_max {
            return Err(CryptoError::SignatureVerificationFailed);
        }
        let (falcon_sig, padding) = body.split_at(falcon_len);
        if padding.iter().any(|&b| b != 0) {
            return Err(CryptoError::SignatureVerificationFailed);
        }

        let falcon_pk = falcon512::PublicKey::from_bytes(falcon_public)
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        let falcon_sig = falcon512::DetachedSignature::from_bytes(falcon_sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)?;

        falcon512::verify_detached_signature(&falcon_sig, digest, &falcon_pk)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::keccak256;
    use crate::keys::Signature;

    #[test]
    fn test_declared_lengths() {
        let alg = HybridSig::new();
        assert_eq!(alg.public_key_length(), 32 + falcon512::public_key_bytes());
        assert_eq!(alg.secret_key_length(), 32 + falcon512::secret_key_bytes());
        assert_eq!(
            alg.signature_length(),
            64 + 2 + falcon512::signature_bytes()
        );
        assert_eq!(
            alg.signature_with_public_key_length(),
            alg.signature_length() + alg.public_key_length() + 4
        );
    }

    #[test]
    fn test_sign_verify() {
        let alg = HybridSig::new();
        let key = alg.generate_key().unwrap();
        let digest = keccak256(b"Hello, hybrid!");

        let signature = alg.sign(&digest, &key).unwrap();
        assert_eq!(signature.len(), alg.signature_length());
        assert!(alg.verify(&digest, &signature, key.public_key()).is_ok());
    }

    #[test]
    fn test_tampered_classic_half_fails() {
        let alg = HybridSig::new();
        let key = alg.generate_key().unwrap();
        let digest = keccak256(b"classic");

        let mut bytes = alg.sign(&digest, &key).unwrap().into_bytes();
        bytes[0] ^= 0x01;

        let result = alg.verify(&digest, &Signature::new(bytes), key.public_key());
        assert!(result.is_err());
    }

    #[test]
    fn test_tampered_falcon_half_fails() {
        let alg = HybridSig::new();
        let key = alg.generate_key().unwrap();
        let digest = keccak256(b"post-quantum");

        let mut bytes = alg.sign(&digest, &key).unwrap().into_bytes();
        bytes[ED25519_SIGNATURE_LENGTH + FALCON_LENGTH_PREFIX + 10] ^= 0x01;

        let result = alg.verify(&digest, &Signature::new(bytes), key.public_key());
        assert!(result.is_err());
    }

    #[test]
    fn test_nonzero_padding_rejected() {
        let alg = HybridSig::new();
        let key = alg.generate_key().unwrap();
        let digest = keccak256(b"padding");

        let mut bytes = alg.sign(&digest, &key).unwrap().into_bytes();
        let falcon_len = u16::from_be_bytes([
            bytes[ED25519_SIGNATURE_LENGTH],
            bytes[ED25519_SIGNATURE_LENGTH + 1],
        ]) as usize;
        let padding_start = ED25519_SIGNATURE_LENGTH + FALCON_LENGTH_PREFIX + falcon_len;

        // Falcon-512 signatures are always shorter than the maximum, so there is padding to flip
        assert!(padding_start < bytes.len());
        let last = bytes.len() - 1;
        bytes[last] = 0x01;

        let result = alg.verify(&digest, &Signature::new(bytes), key.public_key());
        assert!(matches!(result, Err(CryptoError::SignatureVerificationFailed)));
    }

    #[test]
    fn test_oversized_length_prefix_rejected() {
        let alg = HybridSig::new();
        let key = alg.generate_key().unwrap();
        let digest = keccak256(b"prefix");

        let mut bytes = alg.sign(&digest, &key).unwrap().into_bytes();
        bytes[ED25519_SIGNATURE_LENGTH] = 0xFF;
        bytes[ED25519_SIGNATURE_LENGTH + 1] = 0xFF;

        let result = alg.verify(&digest, &Signature::new(bytes), key.public_key());
        assert!(result.is_err());
    }

    #[test]
    fn test_undecodable_falcon_secret_rejected() {
        let alg = HybridSig::new();
        let mut secret = vec![0u8; alg.secret_key_length()];
        secret[..ED25519_SEED_LENGTH].fill(7);

        let result = alg.sign_raw(&secret, &keccak256(b"header"));
        assert!(matches!(result, Err(CryptoError::InvalidPrivateKey)));
    }

    #[test]
    fn test_wrong_secret_length_rejected() {
        let alg = HybridSig::new();
        let result = alg.sign_raw(&[1u8; 10], &[0u8; 32]);
        assert!(matches!(result, Err(CryptoError::InvalidKeyLength { .. })));
    }
}
