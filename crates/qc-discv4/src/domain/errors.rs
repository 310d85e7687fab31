//! Domain Errors for Discovery

use std::fmt;

use qc_crypto::CryptoError;
use rlp::DecoderError;
use thiserror::Error;

/// Errors produced while encoding or decoding discovery packets.
///
/// # Security Note
///
/// Every decode error is a silent drop for the caller. In UDP contexts the
/// source address can be spoofed, so none of these should be used to ban or
/// penalise the apparent sender. Log at DEBUG level only.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Input is shorter than hash + combined signature + type tag
    #[error("packet too small")]
    PacketTooSmall,

    /// Integrity hash does not match the rest of the packet
    #[error("bad hash")]
    BadHash,

    /// Combined signature could not be parsed or did not verify
    #[error("bad signature: {0}")]
    BadSignature(#[source] CryptoError),

    /// Sender public key is the all-zero sentinel
    #[error("invalid public key")]
    InvalidKey,

    /// Type tag is not one of the six packet kinds
    #[error("unknown type: {0}")]
    UnknownType(u8),

    /// RLP payload does not match the packet layout
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] DecoderError),

    /// Local signing failed while encoding
    #[error("signing failed: {0}")]
    Sign(#[source] CryptoError),

    /// A raw RLP field of an outgoing packet would not decode back as written
    #[error("invalid raw field: {0}")]
    InvalidRawField(&'static str),
}

impl DiscoveryError {
    /// Coarse classification for logging and metrics labels.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PacketTooSmall => ErrorKind::Size,
            Self::BadHash => ErrorKind::Integrity,
            Self::BadSignature(_) => ErrorKind::Authentication,
            Self::InvalidKey => ErrorKind::InvalidKey,
            Self::UnknownType(_) => ErrorKind::UnknownType,
            Self::MalformedPayload(_) => ErrorKind::MalformedPayload,
            Self::Sign(_) => ErrorKind::Sign,
            Self::InvalidRawField(_) => ErrorKind::InvalidRawField,
        }
    }

    /// Map a failure from combined-signature extraction.
    ///
    /// The all-zero key gets its own kind; every other framing, length or
    /// verification problem is an authentication failure.
    pub(crate) fn from_verification(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidPublicKey => Self::InvalidKey,
            other => Self::BadSignature(other),
        }
    }
}

/// Error taxonomy for decode and encode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input below the minimum packet size
    Size,
    /// Integrity hash mismatch
    Integrity,
    /// Signature framing or verification failure
    Authentication,
    /// Sender key rejected
    InvalidKey,
    /// Unrecognised packet type
    UnknownType,
    /// Structural payload error
    MalformedPayload,
    /// Local signing failure
    Sign,
    /// Outgoing `record` or `rest` is not well-formed RLP
    InvalidRawField,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Size => write!(f, "size"),
            Self::Integrity => write!(f, "integrity"),
            Self::Authentication => write!(f, "authentication"),
            Self::InvalidKey => write!(f, "invalid_key"),
            Self::UnknownType => write!(f, "unknown_type"),
            Self::MalformedPayload => write!(f, "malformed_payload"),
            Self::Sign => write!(f, "sign"),
            Self::InvalidRawField => write!(f, "invalid_raw_field"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_key_maps_to_invalid_key() {
        let err = DiscoveryError::from_verification(CryptoError::InvalidPublicKey);
        assert_eq!(err.kind(), ErrorKind::InvalidKey);

        let err = DiscoveryError::from_verification(CryptoError::SignatureVerificationFailed);
        assert_eq!(err.kind(), ErrorKind::Authentication);

        let err = DiscoveryError::from_verification(CryptoError::MalformedCombinedSignature);
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    #[test]
    fn test_display() {
        assert_eq!(DiscoveryError::UnknownType(9).to_string(), "unknown type: 9");
        assert_eq!(DiscoveryError::PacketTooSmall.to_string(), "packet too small");
        assert_eq!(ErrorKind::Integrity.to_string(), "integrity");
        assert_eq!(
            DiscoveryError::InvalidRawField("rest").to_string(),
            "invalid raw field: rest"
        );
    }
}
