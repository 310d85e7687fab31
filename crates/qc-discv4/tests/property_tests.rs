//! Property-based tests for the packet codec.
//!
//! The decoder faces untrusted datagrams, so it must reject garbage and any
//! corruption of a valid packet without panicking.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use proptest::prelude::*;
use qc_crypto::{Ed25519Sig, SignatureAlgorithm};
use qc_discv4::{DiscoveryError, EnrRequest, Findnode, Packet, PacketCodec, Pubkey};

fn ed25519_codec() -> PacketCodec {
    PacketCodec::new(Arc::new(Ed25519Sig::new()))
}

// Property: arbitrary input never panics the decoder
proptest! {
    #[test]
    fn prop_decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let _ = ed25519_codec().decode(&data);
    }
}

// Property: random bytes long enough to pass the size check fail the hash
proptest! {
    #[test]
    fn prop_random_packets_fail_integrity(data in prop::collection::vec(any::<u8>(), 133..600)) {
        let result = ed25519_codec().decode(&data);
        prop_assert!(matches!(result, Err(DiscoveryError::BadHash)));
    }
}

// Property: flipping any bit of a valid packet is detected
proptest! {
    #[test]
    fn prop_any_corruption_rejected(index in any::<prop::sample::Index>(), bit in 0u8..8) {
        let codec = ed25519_codec();
        let key = codec.algorithm().generate_key().unwrap();
        let packet = Packet::EnrRequest(EnrRequest { expiration: 1_700_000_000, rest: vec![] });
        let (mut bytes, _) = codec.encode(&key, &packet).unwrap();

        let i = index.index(bytes.len());
        bytes[i] ^= 1 << bit;

        prop_assert!(matches!(codec.decode(&bytes), Err(DiscoveryError::BadHash)));
    }
}

// Property: unknown trailing fields survive a round trip
proptest! {
    #[test]
    fn prop_findnode_round_trip(
        target in prop::collection::vec(any::<u8>(), 32),
        expiration in any::<u64>(),
        extra in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..40), 0..4),
    ) {
        let codec = ed25519_codec();
        let key = codec.algorithm().generate_key().unwrap();
        let rest = extra.iter().map(|item| rlp::encode(item).to_vec()).collect();
        let packet = Packet::Findnode(Findnode { target: Pubkey::new(target), expiration, rest });

        let (bytes, hash) = codec.encode(&key, &packet).unwrap();
        let decoded = codec.decode(&bytes).unwrap();

        prop_assert_eq!(decoded.packet, packet);
        prop_assert_eq!(decoded.hash, hash);
    }
}
