//! Wire form of a node public key.

use std::fmt;

use qc_crypto::{keccak256, CryptoError, PublicKey, SignatureAlgorithm};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

use crate::domain::NodeId;

/// Serialized public key as carried in packets and node descriptors.
///
/// Encoded as a one-element RLP list `[pub_bytes]`. The length is whatever
/// the active algorithm declares; it is only checked when the key is turned
/// back into a [`PublicKey`] with [`decode_pubkey`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Pubkey(pub Vec<u8>);

impl Pubkey {
    /// Wrap serialized key bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Serialized key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Routing identity: `keccak256(pub_bytes)`.
    pub fn id(&self) -> NodeId {
        NodeId::new(keccak256(&self.0))
    }

    /// True when every byte is zero.
    pub fn is_all_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = &self.0[..self.0.len().min(8)];
        write!(f, "Pubkey({}.., {} bytes)", hex::encode(head), self.0.len())
    }
}

impl Encodable for Pubkey {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(1);
        s.append(&self.0);
    }
}

impl Decodable for Pubkey {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 1 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self(rlp.val_at(0)?))
    }
}

/// Serialize a public key into its wire form.
pub fn encode_pubkey(
    alg: &dyn SignatureAlgorithm,
    key: &PublicKey,
) -> Result<Pubkey, CryptoError> {
    alg.serialize_public_key(key).map(Pubkey)
}

/// Parse a wire key back into a [`PublicKey`], rejecting the all-zero key.
pub fn decode_pubkey(alg: &dyn SignatureAlgorithm, key: &Pubkey) -> Result<PublicKey, CryptoError> {
    if key.is_all_zero() {
        return Err(CryptoError::InvalidPublicKey);
    }
    alg.deserialize_public_key(&key.0)
}
