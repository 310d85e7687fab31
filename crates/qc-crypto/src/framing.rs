//! # Combined Signature Framing
//!
//! Signature schemes differ in signature and key size, so the wire cannot
//! assume fixed offsets. A combined signature carries both parts, each behind
//! its own big-endian length field:
//!
//! ```text
//! len(sig) [2] | sig | len(pub) [2] | pub
//! ```

use crate::CryptoError;

/// Width of each length field in a combined signature.
pub const LENGTH_FIELD_SIZE: usize = 2;

/// Largest part a single length field can describe.
pub const MAX_PART_LENGTH: usize = u16::MAX as usize;

/// Pack two byte strings into one length-framed blob.
///
/// # Panics
///
/// Panics if either part is longer than [`MAX_PART_LENGTH`]. Both parts come
/// from the local algorithm whose lengths are fixed well below that bound.
pub fn combine_two_parts(first: &[u8], second: &[u8]) -> Vec<u8> {
    assert!(
        first.len() <= MAX_PART_LENGTH && second.len() <= MAX_PART_LENGTH,
        "combined signature part exceeds length field"
    );

    let mut out = Vec::with_capacity(first.len() + second.len() + 2 * LENGTH_FIELD_SIZE);
    out.extend_from_slice(&(first.len() as u16).to_be_bytes());
    out.extend_from_slice(first);
    out.extend_from_slice(&(second.len() as u16).to_be_bytes());
    out.extend_from_slice(second);
    out
}

/// Split a blob produced by [`combine_two_parts`] back into its parts.
///
/// The framing must account for every byte: truncated input, trailing
/// bytes or length fields pointing past the end are all rejected.
pub fn extract_two_parts(combined: &[u8]) -> Result<(&[u8], &[u8]), CryptoError> {
    let (first, rest) = read_part(combined)?;
    let (second, rest) = read_part(rest)?;

    if !rest.is_empty() {
        return Err(CryptoError::MalformedCombinedSignature);
    }

    Ok((first, second))
}

fn read_part(input: &[u8]) -> Result<(&[u8], &[u8]), CryptoError> {
    if input.len() < LENGTH_FIELD_SIZE {
        return Err(CryptoError::MalformedCombinedSignature);
    }
    let (len_bytes, rest) = input.split_at(LENGTH_FIELD_SIZE);
    let len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;

    if rest.len() < len {
        return Err(CryptoError::MalformedCombinedSignature);
    }
    Ok(rest.split_at(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_layout() {
        let combined = combine_two_parts(&[0xAA; 3], &[0xBB; 2]);
        assert_eq!(combined, vec![0, 3, 0xAA, 0xAA, 0xAA, 0, 2, 0xBB, 0xBB]);
    }

    #[test]
    fn test_extract_returns_exact_parts() {
        let sig = vec![7u8; 700];
        let pubkey = vec![9u8; 900];
        let combined = combine_two_parts(&sig, &pubkey);

        let (s, p) = extract_two_parts(&combined).unwrap();
        assert_eq!(s, sig.as_slice());
        assert_eq!(p, pubkey.as_slice());
    }

    #[test]
    fn test_empty_parts_allowed() {
        let combined = combine_two_parts(&[], &[]);
        let (s, p) = extract_two_parts(&combined).unwrap();
        assert!(s.is_empty());
        assert!(p.is_empty());
    }

    #[test]
    fn test_truncated_input_rejected() {
        let combined = combine_two_parts(&[1u8; 10], &[2u8; 10]);
        for cut in 0..combined.len() {
            assert!(
                extract_two_parts(&combined[..cut]).is_err(),
                "truncation at {} must fail",
                cut
            );
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut combined = combine_two_parts(&[1u8; 4], &[2u8; 4]);
        combined.push(0);
        assert!(matches!(
            extract_two_parts(&combined),
            Err(CryptoError::MalformedCombinedSignature)
        ));
    }

    #[test]
    fn test_length_field_past_end_rejected() {
        let mut combined = combine_two_parts(&[1u8; 4], &[2u8; 4]);
        // First length claims more than the whole blob
        combined[0] = 0xFF;
        assert!(extract_two_parts(&combined).is_err());
    }
}
