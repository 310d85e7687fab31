//! Datagram handling for the bootnode.
//!
//! Every datagram is decoded independently. Anything that fails a check is
//! dropped (the codec already logs why); expired packets are dropped too.
//! Pings get a pong, everything else is only logged.

use std::net::SocketAddr;

use qc_crypto::PrivateKey;
use qc_discv4::{
    expiration_from_now, expired_at, Endpoint, Packet, PacketCodec, Ping, Pong, TimeSource,
};
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

/// Receive buffer size. Post-quantum packets exceed the classic 1280 byte
/// budget, so take anything a UDP datagram can carry.
const RECV_BUFFER_SIZE: usize = 64 * 1024;

/// Stateless ping responder.
pub struct Responder<T: TimeSource> {
    codec: PacketCodec,
    key: PrivateKey,
    expiration_secs: u64,
    time: T,
}

impl<T: TimeSource> Responder<T> {
    /// Create a responder signing with `key`.
    pub fn new(codec: PacketCodec, key: PrivateKey, expiration_secs: u64, time: T) -> Self {
        Self {
            codec,
            key,
            expiration_secs,
            time,
        }
    }

    /// Handle one datagram from `from`; returns the reply to send, if any.
    pub fn handle(&self, datagram: &[u8], from: SocketAddr) -> Option<Vec<u8>> {
        let decoded = self.codec.decode(datagram).ok()?;
        let packet = decoded.packet;

        if let Some(expiration) = packet.expiration() {
            if expired_at(expiration, self.time.now()) {
                debug!(packet = packet.name(), %from, expiration, "dropping expired packet");
                return None;
            }
        }

        match packet {
            Packet::Ping(ping) => {
                debug!(%from, node = %decoded.from.id(), "ping");
                self.pong(&ping, decoded.hash.to_vec(), from)
            }
            other => {
                debug!(packet = other.name(), %from, node = %decoded.from.id(), "ignoring packet");
                None
            }
        }
    }

    fn pong(&self, ping: &Ping, reply_tok: Vec<u8>, from: SocketAddr) -> Option<Vec<u8>> {
        let pong = Packet::Pong(Pong {
            to: Endpoint::from_udp_addr(from, ping.from.tcp),
            reply_tok,
            expiration: expiration_from_now(&self.time, self.expiration_secs),
            enr_seq: 0,
            rest: vec![],
        });

        match self.codec.encode(&self.key, &pong) {
            Ok((bytes, _)) => Some(bytes),
            Err(e) => {
                warn!(%from, error = %e, "failed to encode pong");
                None
            }
        }
    }

    /// Serve `socket` until a receive error that is not per-datagram.
    pub async fn run(&self, socket: &UdpSocket) -> std::io::Result<()> {
        info!(addr = %socket.local_addr()?, "bootnode listening");

        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        loop {
            let (len, from) = match socket.recv_from(&mut buf).await {
                Ok(received) => received,
                // ICMP port unreachable from an earlier send surfaces here on some platforms
                Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => continue,
                Err(e) => return Err(e),
            };

            if let Some(reply) = self.handle(&buf[..len], from) {
                if let Err(e) = socket.send_to(&reply, from).await {
                    warn!(%from, error = %e, "failed to send reply");
                }
            }
        }
    }
}
