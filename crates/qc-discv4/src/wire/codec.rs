//! Authenticated packet envelope.
//!
//! ```text
//! hash (32) | combined signature | tag (1) | rlp body
//!           '--------------- hashed ----------------'
//!                                '----- signed -----'
//! ```
//!
//! The hash is an integrity check against transport corruption only; the
//! signature over `keccak256(tag ∥ body)` is what authenticates the sender.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use qc_crypto::{keccak256, keccak256_many, Hash, PrivateKey, SignatureAlgorithm};
use subtle::ConstantTimeEq;
use tracing::{debug, trace};

use super::{Packet, PacketKind, Pubkey, MAC_SIZE, MAX_PACKET_SIZE};
use crate::domain::{DiscoveryError, Timestamp};
use crate::ports::TimeSource;

/// A packet that passed every envelope check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPacket {
    /// The decoded packet.
    pub packet: Packet,
    /// Verified sender key.
    pub from: Pubkey,
    /// Integrity hash (used as the reply token).
    pub hash: Hash,
}

/// Encoder/decoder for discovery datagrams, bound to one signature algorithm.
///
/// Stateless; share it behind an `Arc` across receive tasks.
#[derive(Debug, Clone)]
pub struct PacketCodec {
    alg: Arc<dyn SignatureAlgorithm>,
    budget: usize,
}

impl PacketCodec {
    /// Create a codec for `alg` with the historical [`MAX_PACKET_SIZE`] budget.
    pub fn new(alg: Arc<dyn SignatureAlgorithm>) -> Self {
        Self::with_packet_budget(alg, MAX_PACKET_SIZE)
    }

    /// Create a codec that reports outgoing packets above `budget` bytes.
    pub fn with_packet_budget(alg: Arc<dyn SignatureAlgorithm>, budget: usize) -> Self {
        Self { alg, budget }
    }

    /// Advisory datagram size; larger packets are logged, never refused.
    pub fn packet_budget(&self) -> usize {
        self.budget
    }

    /// True when a datagram of `size` bytes is over the budget.
    pub fn exceeds_budget(&self, size: usize) -> bool {
        size > self.budget
    }

    /// The algorithm packets are signed with.
    pub fn algorithm(&self) -> &Arc<dyn SignatureAlgorithm> {
        &self.alg
    }

    /// Smallest datagram that can hold an envelope: hash, combined
    /// signature and the type tag.
    pub fn min_packet_size(&self) -> usize {
        MAC_SIZE + self.alg.signature_with_public_key_length() + 1
    }

    /// Sign and frame a packet. Returns the datagram and its hash.
    pub fn encode(
        &self,
        key: &PrivateKey,
        packet: &Packet,
    ) -> Result<(Vec<u8>, Hash), DiscoveryError> {
        let payload = packet.to_payload()?;
        let digest = keccak256(&payload);

        let sig_block = self
            .alg
            .sign_combined(&digest, key)
            .map_err(DiscoveryError::Sign)?;
        let hash = keccak256_many(&[sig_block.as_slice(), payload.as_slice()]);

        let mut out = Vec::with_capacity(MAC_SIZE + sig_block.len() + payload.len());
        out.extend_from_slice(&hash);
        out.extend_from_slice(&sig_block);
        out.extend_from_slice(&payload);

        if self.exceeds_budget(out.len()) {
            trace!(
                packet = packet.name(),
                size = out.len(),
                budget = self.budget,
                "packet exceeds datagram budget"
            );
        }

        Ok((out, hash))
    }

    /// Check and decode a datagram.
    ///
    /// Checks run cheapest first: size, integrity hash, signature, then the
    /// RLP body. No key is returned unless its signature verified.
    pub fn decode(&self, input: &[u8]) -> Result<DecodedPacket, DiscoveryError> {
        let result = self.decode_inner(input);
        if let Err(err) = &result {
            debug!(kind = %err.kind(), size = input.len(), error = %err, "dropping packet");
        }
        result
    }

    fn decode_inner(&self, input: &[u8]) -> Result<DecodedPacket, DiscoveryError> {
        if input.len() < MAC_SIZE || input.len() < self.min_packet_size() {
            return Err(DiscoveryError::PacketTooSmall);
        }

        let sig_size = self.alg.signature_with_public_key_length();
        let (hash, tail) = input.split_at(MAC_SIZE);
        let (sig_block, payload) = tail.split_at(sig_size);

        let expected = keccak256(tail);
        if !bool::from(hash.ct_eq(&expected[..])) {
            return Err(DiscoveryError::BadHash);
        }

        let digest = keccak256(payload);
        let from = self
            .alg
            .public_key_bytes_from_signature(&digest, sig_block)
            .map_err(DiscoveryError::from_verification)?;

        let tag = payload[0];
        let kind = PacketKind::from_tag(tag).ok_or(DiscoveryError::UnknownType(tag))?;
        let packet = Packet::decode_body(kind, &payload[1..])?;

        Ok(DecodedPacket {
            packet,
            from: Pubkey::new(from),
            hash: expected,
        })
    }
}

/// True once `ts` (unix seconds) is in the past by the system clock.
pub fn expired(ts: u64) -> bool {
    match UNIX_EPOCH.checked_add(Duration::from_secs(ts)) {
        Some(deadline) => deadline < SystemTime::now(),
        // Beyond what the platform clock can represent
        None => false,
    }
}

/// True once `ts` is strictly before `now`.
pub fn expired_at(ts: u64, now: Timestamp) -> bool {
    ts < now.as_secs()
}

/// Expiration stamp `secs` seconds after the current time.
pub fn expiration_from_now(time: &dyn TimeSource, secs: u64) -> u64 {
    time.now().add_secs(secs).as_secs()
}
