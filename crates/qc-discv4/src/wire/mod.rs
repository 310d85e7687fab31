//! # Discovery v4 Wire Protocol
//!
//! Packet types, their RLP layouts, and the authenticated envelope codec.
//!
//! Every packet body is an RLP list. Fields after the known ones are kept
//! verbatim in `rest` so newer peers can extend packets without breaking
//! older ones.
//!
//! | Tag | Packet | Layout |
//! |-----|--------|--------|
//! | 1 | Ping | `[version, from, to, expiration, enr_seq?, rest..]` |
//! | 2 | Pong | `[to, reply_tok, expiration, enr_seq?, rest..]` |
//! | 3 | Findnode | `[target, expiration, rest..]` |
//! | 4 | Neighbors | `[[node..], expiration, rest..]` |
//! | 5 | ENRRequest | `[expiration, rest..]` |
//! | 6 | ENRResponse | `[reply_tok, record, rest..]` |

mod codec;
mod pubkey;


use std::net;

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

pub use codec::{expiration_from_now, expired, expired_at, DecodedPacket, PacketCodec};
pub use pubkey::{decode_pubkey, encode_pubkey, Pubkey};

use crate::domain::{DiscoveryError, IpAddr};
use crate::node::{decode_ip, Node};

/// Size of the integrity hash prefix.
pub const MAC_SIZE: usize = 32;

/// Historical datagram budget. Post-quantum keys push every packet past it,
/// so it is advisory only.
pub const MAX_PACKET_SIZE: usize = 1280;

/// Maximum number of nodes in one `Neighbors` packet.
pub const MAX_NEIGHBORS: usize = 1;

/// Protocol version carried in `Ping`.
pub const PROTOCOL_VERSION: u32 = 4;

// =============================================================================
// PACKET KIND
// =============================================================================

/// One-byte packet type tag. Zero is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketKind {
    /// Liveness probe.
    Ping = 1,
    /// Reply to `Ping`.
    Pong = 2,
    /// Query for nodes close to a target.
    Findnode = 3,
    /// Reply to `Findnode`.
    Neighbors = 4,
    /// Query for the remote node record.
    EnrRequest = 5,
    /// Reply to `EnrRequest`.
    EnrResponse = 6,
}

impl PacketKind {
    /// Parse a tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Ping),
            2 => Some(Self::Pong),
            3 => Some(Self::Findnode),
            4 => Some(Self::Neighbors),
            5 => Some(Self::EnrRequest),
            6 => Some(Self::EnrResponse),
            _ => None,
        }
    }

    /// Tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Name for logging.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ping => "PING/v4",
            Self::Pong => "PONG/v4",
            Self::Findnode => "FINDNODE/v4",
            Self::Neighbors => "NEIGHBORS/v4",
            Self::EnrRequest => "ENRREQUEST/v4",
            Self::EnrResponse => "ENRRESPONSE/v4",
        }
    }
}

// =============================================================================
// ENDPOINT
// =============================================================================

/// A network endpoint. RLP: `[ip, udp, tcp]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// IP address.
    pub ip: IpAddr,
    /// Discovery (UDP) port.
    pub udp: u16,
    /// Transport (TCP) port.
    pub tcp: u16,
}

impl Endpoint {
    /// Create an endpoint.
    pub fn new(ip: IpAddr, udp: u16, tcp: u16) -> Self {
        Self { ip, udp, tcp }
    }

    /// Endpoint for a UDP address plus a TCP port.
    pub fn from_udp_addr(addr: net::SocketAddr, tcp: u16) -> Self {
        Self::new(addr.ip().into(), addr.port(), tcp)
    }

    /// The UDP socket address.
    pub fn udp_addr(&self) -> net::SocketAddr {
        net::SocketAddr::new(self.ip.into(), self.udp)
    }
}

impl Encodable for Endpoint {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.ip.as_slice().to_vec());
        s.append(&self.udp);
        s.append(&self.tcp);
    }
}

impl Decodable for Endpoint {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            ip: decode_ip(&rlp.at(0)?)?,
            udp: rlp.val_at(1)?,
            tcp: rlp.val_at(2)?,
        })
    }
}

// =============================================================================
// PACKETS
// =============================================================================

/// Liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ping {
    /// Protocol version.
    pub version: u32,
    /// Sender endpoint.
    pub from: Endpoint,
    /// Recipient endpoint.
    pub to: Endpoint,
    /// Absolute expiry (unix seconds).
    pub expiration: u64,
    /// Sequence number of the sender's node record (0 when unknown).
    pub enr_seq: u64,
    /// Unknown trailing fields, raw.
    pub rest: Vec<Vec<u8>>,
}

/// Reply to [`Ping`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pong {
    /// Mirrors the UDP envelope address of the ping, so the pinger learns its
    /// external address.
    pub to: Endpoint,
    /// Hash of the ping packet.
    pub reply_tok: Vec<u8>,
    /// Absolute expiry (unix seconds).
    pub expiration: u64,
    /// Sequence number of the sender's node record (0 when unknown).
    pub enr_seq: u64,
    /// Unknown trailing fields, raw.
    pub rest: Vec<Vec<u8>>,
}

/// Query for nodes close to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Findnode {
    /// Key whose neighbourhood is requested.
    pub target: Pubkey,
    /// Absolute expiry (unix seconds).
    pub expiration: u64,
    /// Unknown trailing fields, raw.
    pub rest: Vec<Vec<u8>>,
}

/// Reply to [`Findnode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbors {
    /// At most [`MAX_NEIGHBORS`] nodes when produced locally.
    pub nodes: Vec<Node>,
    /// Absolute expiry (unix seconds).
    pub expiration: u64,
    /// Unknown trailing fields, raw.
    pub rest: Vec<Vec<u8>>,
}

/// Query for the remote node record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrRequest {
    /// Absolute expiry (unix seconds).
    pub expiration: u64,
    /// Unknown trailing fields, raw.
    pub rest: Vec<Vec<u8>>,
}

/// Reply to [`EnrRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrResponse {
    /// Hash of the request packet.
    pub reply_tok: Vec<u8>,
    /// Node record as one raw RLP list (not interpreted here). The empty
    /// record is `[0xC0]`.
    pub record: Vec<u8>,
    /// Unknown trailing fields, raw.
    pub rest: Vec<Vec<u8>>,
}

impl Encodable for Ping {
    fn rlp_append(&self, s: &mut RlpStream) {
        let with_seq = self.enr_seq != 0 || !self.rest.is_empty();
        s.begin_list(4 + usize::from(with_seq) + self.rest.len());
        s.append(&self.version);
        s.append(&self.from);
        s.append(&self.to);
        s.append(&self.expiration);
        if with_seq {
            s.append(&self.enr_seq);
        }
        append_rest(s, &self.rest);
    }
}

impl Decodable for Ping {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let count = expect_list(rlp, 4)?;
        Ok(Self {
            version: rlp.val_at(0)?,
            from: rlp.val_at(1)?,
            to: rlp.val_at(2)?,
            expiration: rlp.val_at(3)?,
            enr_seq: optional_at(rlp, count, 4)?,
            rest: rest_from(rlp, count, 5)?,
        })
    }
}

impl Encodable for Pong {
    fn rlp_append(&self, s: &mut RlpStream) {
        let with_seq = self.enr_seq != 0 || !self.rest.is_empty();
        s.begin_list(3 + usize::from(with_seq) + self.rest.len());
        s.append(&self.to);
        s.append(&self.reply_tok);
        s.append(&self.expiration);
        if with_seq {
            s.append(&self.enr_seq);
        }
        append_rest(s, &self.rest);
    }
}

impl Decodable for Pong {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let count = expect_list(rlp, 3)?;
        Ok(Self {
            to: rlp.val_at(0)?,
            reply_tok: rlp.val_at(1)?,
            expiration: rlp.val_at(2)?,
            enr_seq: optional_at(rlp, count, 3)?,
            rest: rest_from(rlp, count, 4)?,
        })
    }
}

impl Encodable for Findnode {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2 + self.rest.len());
        s.append(&self.target);
        s.append(&self.expiration);
        append_rest(s, &self.rest);
    }
}

impl Decodable for Findnode {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let count = expect_list(rlp, 2)?;
        Ok(Self {
            target: rlp.val_at(0)?,
            expiration: rlp.val_at(1)?,
            rest: rest_from(rlp, count, 2)?,
        })
    }
}

impl Encodable for Neighbors {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2 + self.rest.len());
        s.begin_list(self.nodes.len());
        for node in &self.nodes {
            s.append(node);
        }
        s.append(&self.expiration);
        append_rest(s, &self.rest);
    }
}

impl Decodable for Neighbors {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let count = expect_list(rlp, 2)?;
        Ok(Self {
            nodes: rlp.list_at(0)?,
            expiration: rlp.val_at(1)?,
            rest: rest_from(rlp, count, 2)?,
        })
    }
}

impl Encodable for EnrRequest {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(1 + self.rest.len());
        s.append(&self.expiration);
        append_rest(s, &self.rest);
    }
}

impl Decodable for EnrRequest {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let count = expect_list(rlp, 1)?;
        Ok(Self {
            expiration: rlp.val_at(0)?,
            rest: rest_from(rlp, count, 1)?,
        })
    }
}

impl Encodable for EnrResponse {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2 + self.rest.len());
        s.append(&self.reply_tok);
        s.append_raw(&self.record, 1);
        append_rest(s, &self.rest);
    }
}

impl Decodable for EnrResponse {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let count = expect_list(rlp, 2)?;
        let record = rlp.at(1)?;
        if !record.is_list() {
            return Err(DecoderError::RlpExpectedToBeList);
        }
        Ok(Self {
            reply_tok: rlp.val_at(0)?,
            record: record.as_raw().to_vec(),
            rest: rest_from(rlp, count, 2)?,
        })
    }
}

// =============================================================================
// PACKET
// =============================================================================

/// Any discovery packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// Tag 1.
    Ping(Ping),
    /// Tag 2.
    Pong(Pong),
    /// Tag 3.
    Findnode(Findnode),
    /// Tag 4.
    Neighbors(Neighbors),
    /// Tag 5.
    EnrRequest(EnrRequest),
    /// Tag 6.
    EnrResponse(EnrResponse),
}

impl Packet {
    /// Packet type.
    pub fn kind(&self) -> PacketKind {
        match self {
            Self::Ping(_) => PacketKind::Ping,
            Self::Pong(_) => PacketKind::Pong,
            Self::Findnode(_) => PacketKind::Findnode,
            Self::Neighbors(_) => PacketKind::Neighbors,
            Self::EnrRequest(_) => PacketKind::EnrRequest,
            Self::EnrResponse(_) => PacketKind::EnrResponse,
        }
    }

    /// Name for logging.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Absolute expiry, for the packets that carry one.
    pub fn expiration(&self) -> Option<u64> {
        match self {
            Self::Ping(p) => Some(p.expiration),
            Self::Pong(p) => Some(p.expiration),
            Self::Findnode(p) => Some(p.expiration),
            Self::Neighbors(p) => Some(p.expiration),
            Self::EnrRequest(p) => Some(p.expiration),
            Self::EnrResponse(_) => None,
        }
    }

    /// Unknown trailing fields, raw.
    pub fn rest(&self) -> &[Vec<u8>] {
        match self {
            Self::Ping(p) => &p.rest,
            Self::Pong(p) => &p.rest,
            Self::Findnode(p) => &p.rest,
            Self::Neighbors(p) => &p.rest,
            Self::EnrRequest(p) => &p.rest,
            Self::EnrResponse(p) => &p.rest,
        }
    }

    /// Reject raw fields that would not survive a decode: every `rest`
    /// entry must be exactly one RLP item and an ENR `record` exactly one
    /// RLP list.
    pub fn check_raw_fields(&self) -> Result<(), DiscoveryError> {
        if let Self::EnrResponse(resp) = self {
            if !is_single_item(&resp.record) || !Rlp::new(&resp.record).is_list() {
                return Err(DiscoveryError::InvalidRawField("record"));
            }
        }
        if !self.rest().iter().all(|item| is_single_item(item)) {
            return Err(DiscoveryError::InvalidRawField("rest"));
        }
        Ok(())
    }

    /// `tag ∥ rlp(body)`, after [`Packet::check_raw_fields`].
    pub fn to_payload(&self) -> Result<Vec<u8>, DiscoveryError> {
        self.check_raw_fields()?;
        let body = match self {
            Self::Ping(p) => rlp::encode(p),
            Self::Pong(p) => rlp::encode(p),
            Self::Findnode(p) => rlp::encode(p),
            Self::Neighbors(p) => rlp::encode(p),
            Self::EnrRequest(p) => rlp::encode(p),
            Self::EnrResponse(p) => rlp::encode(p),
        };

        let mut payload = Vec::with_capacity(1 + body.len());
        payload.push(self.kind().tag());
        payload.extend_from_slice(&body);
        Ok(payload)
    }

    /// Decode an RLP body of the given kind. The body must be exactly one
    /// RLP list with nothing after it.
    pub fn decode_body(kind: PacketKind, body: &[u8]) -> Result<Self, DecoderError> {
        let rlp = Rlp::new(body);
        if rlp.payload_info()?.total() != body.len() {
            return Err(DecoderError::RlpInconsistentLengthAndData);
        }

        Ok(match kind {
            PacketKind::Ping => Self::Ping(rlp.as_val()?),
            PacketKind::Pong => Self::Pong(rlp.as_val()?),
            PacketKind::Findnode => Self::Findnode(rlp.as_val()?),
            PacketKind::Neighbors => Self::Neighbors(rlp.as_val()?),
            PacketKind::EnrRequest => Self::EnrRequest(rlp.as_val()?),
            PacketKind::EnrResponse => Self::EnrResponse(rlp.as_val()?),
        })
    }
}

// =============================================================================
// RLP HELPERS
// =============================================================================

fn expect_list(rlp: &Rlp, min_items: usize) -> Result<usize, DecoderError> {
    if !rlp.is_list() {
        return Err(DecoderError::RlpExpectedToBeList);
    }
    let count = rlp.item_count()?;
    if count < min_items {
        return Err(DecoderError::RlpIncorrectListLen);
    }
    Ok(count)
}

fn optional_at(rlp: &Rlp, count: usize, index: usize) -> Result<u64, DecoderError> {
    if index < count {
        rlp.val_at(index)
    } else {
        Ok(0)
    }
}

fn rest_from(rlp: &Rlp, count: usize, start: usize) -> Result<Vec<Vec<u8>>, DecoderError> {
    (start..count)
        .map(|i| rlp.at(i).map(|item| item.as_raw().to_vec()))
        .collect()
}

fn is_single_item(raw: &[u8]) -> bool {
    Rlp::new(raw)
        .payload_info()
        .map_or(false, |info| info.total() == raw.len())
}

fn append_rest(s: &mut RlpStream, rest: &[Vec<u8>]) {
    for item in rest {
        s.append_raw(item, 1);
    }
}
