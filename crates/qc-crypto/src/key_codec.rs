//! # Key Codec
//!
//! Hex and file wrappers around the algorithm's fixed-length key
//! serialization.
//!
//! ## Key File Format
//!
//! A key file holds exactly `2 × private_key_length()` ASCII hex characters,
//! optionally followed by at most two `\n`/`\r` bytes (so files written by
//! hand or by `echo` load as well).

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use zeroize::Zeroize;

use crate::algorithm::SignatureAlgorithm;
use crate::keys::{PrivateKey, PublicKey};
use crate::CryptoError;

/// Newline bytes tolerated after the hex body of a key file.
const MAX_TRAILING_NEWLINES: usize = 2;

/// Key (de)serialization bound to one signature algorithm.
#[derive(Debug, Clone)]
pub struct KeyCodec {
    alg: Arc<dyn SignatureAlgorithm>,
}

impl KeyCodec {
    /// Create a codec for `alg`.
    pub fn new(alg: Arc<dyn SignatureAlgorithm>) -> Self {
        Self { alg }
    }

    /// The algorithm this codec serializes for.
    pub fn algorithm(&self) -> &Arc<dyn SignatureAlgorithm> {
        &self.alg
    }

    /// Hex-encode a private key (lowercase, no prefix).
    pub fn private_key_to_hex(&self, key: &PrivateKey) -> Result<String, CryptoError> {
        let mut bytes = self.alg.serialize_private_key(key)?;
        let encoded = hex::encode(&bytes);
        bytes.zeroize();
        Ok(encoded)
    }

    /// Parse a hex-encoded private key.
    pub fn hex_to_private_key(&self, hex_key: &str) -> Result<PrivateKey, CryptoError> {
        let mut bytes = hex::decode(hex_key.trim())?;
        let result = self.alg.deserialize_private_key(&bytes);
        bytes.zeroize();
        result
    }

    /// Hex-encode a public key.
    pub fn public_key_to_hex(&self, key: &PublicKey) -> Result<String, CryptoError> {
        Ok(hex::encode(self.alg.serialize_public_key(key)?))
    }

    /// Parse a hex-encoded public key.
    pub fn hex_to_public_key(&self, hex_key: &str) -> Result<PublicKey, CryptoError> {
        let bytes = hex::decode(hex_key.trim())?;
        self.alg.deserialize_public_key(&bytes)
    }

    /// Load a private key from a key file.
    ///
    /// Reads at most one byte past the longest valid file, so pointing this
    /// at something large fails fast.
    pub fn load_private_key_from_file(&self, path: &Path) -> Result<PrivateKey, CryptoError> {
        let limit = 2 * self.alg.private_key_length() + MAX_TRAILING_NEWLINES + 1;
        let mut contents = Vec::with_capacity(limit);
        if let Err(e) = File::open(path)?
            .take(limit as u64)
            .read_to_end(&mut contents)
        {
            contents.zeroize();
            return Err(e.into());
        }
        let result = self.parse_key_file(&contents);
        contents.zeroize();

        if result.is_ok() {
            debug!(path = %path.display(), alg = self.alg.name(), "loaded private key");
        }
        result
    }

    /// Write a private key as hex with owner-only permissions.
    pub fn save_private_key_to_file(
        &self,
        path: &Path,
        key: &PrivateKey,
    ) -> Result<(), CryptoError> {
        let encoded = self.private_key_to_hex(key)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        file.write_all(encoded.as_bytes())?;
        file.sync_all()?;

        debug!(path = %path.display(), alg = self.alg.name(), "saved private key");
        Ok(())
    }

    fn parse_key_file(&self, contents: &[u8]) -> Result<PrivateKey, CryptoError> {
        let expected = 2 * self.alg.private_key_length();
        if contents.len() < expected {
            return Err(CryptoError::KeyFileTooShort { expected });
        }

        let (body, trailer) = contents.split_at(expected);
        for (i, &b) in trailer.iter().enumerate() {
            if b != b'\n' && b != b'\r' {
                return Err(CryptoError::KeyFileInvalidTrailer(b as char));
            }
            if i >= MAX_TRAILING_NEWLINES {
                return Err(CryptoError::KeyFileTooLong { expected });
            }
        }

        let mut bytes = hex::decode(body)?;
        let result = self.alg.deserialize_private_key(&bytes);
        bytes.zeroize();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ed25519::Ed25519Sig;

    fn codec() -> KeyCodec {
        KeyCodec::new(Arc::new(Ed25519Sig::new()))
    }

    #[test]
    fn test_hex_length_matches_private_key_length() {
        let codec = codec();
        let key = codec.algorithm().generate_key().unwrap();
        let encoded = codec.private_key_to_hex(&key).unwrap();
        assert_eq!(encoded.len(), 2 * codec.algorithm().private_key_length());
    }

    #[test]
    fn test_parse_accepts_up_to_two_newlines() {
        let codec = codec();
        let key = codec.algorithm().generate_key().unwrap();
        let encoded = codec.private_key_to_hex(&key).unwrap();

        for suffix in ["", "\n", "\r\n", "\n\n"] {
            let contents = format!("{}{}", encoded, suffix);
            let parsed = codec.parse_key_file(contents.as_bytes()).unwrap();
            assert_eq!(parsed.public_key(), key.public_key());
        }
    }

    #[test]
    fn test_parse_rejects_bad_trailers() {
        let codec = codec();
        let key = codec.algorithm().generate_key().unwrap();
        let encoded = codec.private_key_to_hex(&key).unwrap();

        let too_long = format!("{}\n\n\n", encoded);
        assert!(matches!(
            codec.parse_key_file(too_long.as_bytes()),
            Err(CryptoError::KeyFileTooLong { .. })
        ));

        let junk = format!("{} ", encoded);
        assert!(matches!(
            codec.parse_key_file(junk.as_bytes()),
            Err(CryptoError::KeyFileInvalidTrailer(' '))
        ));

        let short = &encoded[..encoded.len() - 1];
        assert!(matches!(
            codec.parse_key_file(short.as_bytes()),
            Err(CryptoError::KeyFileTooShort { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_non_hex_body() {
        let codec = codec();
        let contents = "zz".repeat(codec.algorithm().private_key_length());
        assert!(matches!(
            codec.parse_key_file(contents.as_bytes()),
            Err(CryptoError::InvalidHex(_))
        ));
    }
}
