//! Values shared by the wire codec and the node helpers.

use std::fmt;
use std::net;

use subtle::ConstantTimeEq;

/// Keccak-256 of a node's serialized public key.
///
/// Comparison runs in constant time, so a peer sending crafted IDs
/// learns nothing from how long a lookup takes.
// Hash over the raw bytes agrees with the manual PartialEq.
#[allow(clippy::derived_hash_with_manual_eq)]
#[derive(Clone, Copy, Hash)]
pub struct NodeId(pub [u8; 32]);

impl PartialEq for NodeId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for NodeId {}

impl NodeId {
    /// Wrap a digest.
    pub fn new(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    /// The digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short prefix keeps log lines readable
        write!(f, "NodeId({}..)", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Endpoint address in its RLP form: a 4 or 16 byte string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpAddr {
    /// 4-byte string.
    V4([u8; 4]),
    /// 16-byte string.
    V6([u8; 16]),
}

impl IpAddr {
    /// `a.b.c.d`.
    pub fn v4(a: u8, b: u8, c: u8, d: u8) -> Self {
        IpAddr::V4([a, b, c, d])
    }

    /// IPv6 from its network-order octets.
    pub fn v6(octets: [u8; 16]) -> Self {
        IpAddr::V6(octets)
    }

    /// Decode an RLP byte string. Any length other than 4 or 16 is `None`.
    pub fn from_slice(raw: &[u8]) -> Option<Self> {
        if let Ok(octets) = <[u8; 4]>::try_from(raw) {
            return Some(IpAddr::V4(octets));
        }
        <[u8; 16]>::try_from(raw).ok().map(IpAddr::V6)
    }

    /// Bytes as they are written into an endpoint.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            IpAddr::V4(octets) => octets,
            IpAddr::V6(octets) => octets,
        }
    }

    /// `0.0.0.0` or `::`.
    pub fn is_unspecified(&self) -> bool {
        net::IpAddr::from(*self).is_unspecified()
    }
}

impl From<net::IpAddr> for IpAddr {
    /// `::ffff:a.b.c.d` is written as the plain 4-byte address.
    fn from(ip: net::IpAddr) -> Self {
        match ip {
            net::IpAddr::V4(v4) => IpAddr::V4(v4.octets()),
            net::IpAddr::V6(v6) => v6
                .to_ipv4_mapped()
                .map_or(IpAddr::V6(v6.octets()), |v4| IpAddr::V4(v4.octets())),
        }
    }
}

impl From<IpAddr> for net::IpAddr {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(octets) => net::Ipv4Addr::from(octets).into(),
            IpAddr::V6(octets) => net::Ipv6Addr::from(octets).into(),
        }
    }
}

impl fmt::Display for IpAddr {
    /// IPv6 is bracketed so a `:port` suffix can follow.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match net::IpAddr::from(*self) {
            net::IpAddr::V4(v4) => write!(f, "{}", v4),
            net::IpAddr::V6(v6) => write!(f, "[{}]", v6),
        }
    }
}

/// Unix seconds, never above [`Timestamp::MAX_REASONABLE`].
///
/// The ceiling keeps `now + expiration` from wrapping when a clock or a
/// packet field is absurd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// 9999-12-31T23:59:59Z.
    pub const MAX_REASONABLE: u64 = 253_402_300_799;

    /// Values past the ceiling are pulled down to it.
    pub fn new(secs: u64) -> Self {
        Self(secs.min(Self::MAX_REASONABLE))
    }

    /// Seconds since the epoch.
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Later timestamp, stopping at the ceiling.
    pub fn add_secs(&self, secs: u64) -> Self {
        Self::new(self.0.saturating_add(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_compares_by_value() {
        assert_eq!(NodeId::new([1u8; 32]), NodeId::new([1u8; 32]));
        assert_ne!(NodeId::new([1u8; 32]), NodeId::new([2u8; 32]));

        let mut last_differs = [1u8; 32];
        last_differs[31] = 0;
        assert_ne!(NodeId::new([1u8; 32]), NodeId::new(last_differs));
    }

    #[test]
    fn test_node_id_formatting() {
        let id = NodeId::new([0xAB; 32]);
        assert_eq!(id.to_string(), "ab".repeat(32));
        assert_eq!(format!("{:?}", id), format!("NodeId({}..)", "ab".repeat(8)));
    }

    #[test]
    fn test_ip_from_rlp_string() {
        assert_eq!(IpAddr::from_slice(&[10, 0, 0, 1]), Some(IpAddr::v4(10, 0, 0, 1)));
        assert_eq!(IpAddr::from_slice(&[7u8; 16]), Some(IpAddr::v6([7u8; 16])));
        assert_eq!(IpAddr::from_slice(&[]), None);
        assert_eq!(IpAddr::from_slice(&[1, 2, 3]), None);
        assert_eq!(IpAddr::from_slice(&[0u8; 5]), None);
    }

    #[test]
    fn test_mapped_v6_becomes_v4() {
        let mapped: net::IpAddr = "::ffff:192.168.1.7".parse().unwrap();
        let ip = IpAddr::from(mapped);
        assert_eq!(ip, IpAddr::v4(192, 168, 1, 7));
        assert_eq!(ip.as_slice().len(), 4);
    }

    #[test]
    fn test_unspecified() {
        assert!(IpAddr::v4(0, 0, 0, 0).is_unspecified());
        assert!(IpAddr::v6([0u8; 16]).is_unspecified());
        assert!(!IpAddr::v4(127, 0, 0, 1).is_unspecified());
    }

    #[test]
    fn test_ip_display() {
        assert_eq!(IpAddr::v4(127, 0, 0, 1).to_string(), "127.0.0.1");
        let v6: net::IpAddr = "fe80::1".parse().unwrap();
        assert_eq!(IpAddr::from(v6).to_string(), "[fe80::1]");
    }

    #[test]
    fn test_timestamp_ceiling() {
        assert_eq!(Timestamp::new(100).add_secs(50).as_secs(), 150);
        assert_eq!(Timestamp::new(u64::MAX).as_secs(), Timestamp::MAX_REASONABLE);
        assert_eq!(
            Timestamp::new(Timestamp::MAX_REASONABLE).add_secs(u64::MAX).as_secs(),
            Timestamp::MAX_REASONABLE
        );
        assert!(Timestamp::new(1) < Timestamp::new(2));
    }
}
