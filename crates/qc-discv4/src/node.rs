//! # Node Identity
//!
//! [`Node`] is the bare descriptor other peers hand us (in `Neighbors`
//! replies, or from configuration). [`TableNode`] is the same descriptor
//! augmented with the local bookkeeping the routing table keeps for it.
//!
//! Wrapping and unwrapping are pure: liveness counters start at zero and are
//! only ever changed by the table's scheduler.

use std::fmt;
use std::net;

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

use crate::domain::{IpAddr, NodeId, Timestamp};
use crate::wire::Pubkey;

/// A host on the network.
///
/// RLP: `[ip, udp, tcp, [pub_bytes]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// IP address (4 or 16 bytes on the wire).
    pub ip: IpAddr,
    /// Discovery (UDP) port.
    pub udp: u16,
    /// Transport (TCP) port.
    pub tcp: u16,
    /// Serialized public key.
    pub pubkey: Pubkey,
}

impl Node {
    /// Create a node descriptor.
    pub fn new(pubkey: Pubkey, ip: IpAddr, udp: u16, tcp: u16) -> Self {
        Self { ip, udp, tcp, pubkey }
    }

    /// Routing identity derived from the public key.
    pub fn id(&self) -> NodeId {
        self.pubkey.id()
    }

    /// UDP endpoint used for discovery traffic.
    pub fn udp_addr(&self) -> net::SocketAddr {
        net::SocketAddr::new(self.ip.into(), self.udp)
    }
}

impl fmt::Display for Node {
    /// `enode://<hex pubkey>@<ip>:<tcp>[?discport=<udp>]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "enode://{}@{}:{}",
            hex::encode(self.pubkey.as_bytes()),
            self.ip,
            self.tcp
        )?;
        if self.udp != self.tcp {
            write!(f, "?discport={}", self.udp)?;
        }
        Ok(())
    }
}

impl Encodable for Node {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        s.append(&self.ip.as_slice().to_vec());
        s.append(&self.udp);
        s.append(&self.tcp);
        s.append(&self.pubkey);
    }
}

impl Decodable for Node {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 4 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            ip: decode_ip(&rlp.at(0)?)?,
            udp: rlp.val_at(1)?,
            tcp: rlp.val_at(2)?,
            pubkey: rlp.val_at(3)?,
        })
    }
}

/// Decode a 4- or 16-byte IP string.
pub(crate) fn decode_ip(rlp: &Rlp) -> Result<IpAddr, DecoderError> {
    IpAddr::from_slice(rlp.data()?).ok_or(DecoderError::Custom("invalid IP length"))
}

/// A routing-table entry: a [`Node`] plus local liveness metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNode {
    /// The wrapped descriptor.
    pub node: Node,
    /// When the node entered the table (`None` until inserted).
    pub added_at: Option<Timestamp>,
    /// How often liveness has been checked.
    pub liveness_checks: u32,
}

impl TableNode {
    /// UDP address of the wrapped node.
    pub fn addr(&self) -> net::SocketAddr {
        self.node.udp_addr()
    }

    /// Routing identity of the wrapped node.
    pub fn id(&self) -> NodeId {
        self.node.id()
    }
}

impl fmt::Display for TableNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.node, f)
    }
}

/// Wrap a descriptor with fresh (zeroed) table metadata.
pub fn wrap_node(node: Node) -> TableNode {
    TableNode {
        node,
        added_at: None,
        liveness_checks: 0,
    }
}

/// Wrap every descriptor, preserving order.
pub fn wrap_nodes(nodes: Vec<Node>) -> Vec<TableNode> {
    nodes.into_iter().map(wrap_node).collect()
}

/// Strip table metadata.
pub fn unwrap_node(node: TableNode) -> Node {
    node.node
}

/// Strip table metadata from every entry, preserving order.
pub fn unwrap_nodes(nodes: Vec<TableNode>) -> Vec<Node> {
    nodes.into_iter().map(unwrap_node).collect()
}
