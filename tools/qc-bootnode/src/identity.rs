//! What the bootnode prints about itself.

use std::net::SocketAddr;

use anyhow::Result;
use qc_crypto::{PrivateKey, SignatureAlgorithm};
use qc_discv4::{encode_pubkey, IpAddr, Node};

/// enode URL advertised for `local`.
///
/// An unspecified bind address is shown as loopback; the TCP port is 0 since
/// a bootnode only speaks discovery.
pub fn enode_url(alg: &dyn SignatureAlgorithm, key: &PrivateKey, local: SocketAddr) -> Result<String> {
    let mut ip = IpAddr::from(local.ip());
    if ip.is_unspecified() {
        ip = IpAddr::v4(127, 0, 0, 1);
    }
    let pubkey = encode_pubkey(alg, key.public_key())?;
    Ok(Node::new(pubkey, ip, local.port(), 0).to_string())
}

/// Hex address and hex node ID of `key`.
pub fn address_and_id(alg: &dyn SignatureAlgorithm, key: &PrivateKey) -> Result<(String, String)> {
    let address = alg.public_key_to_address(key.public_key())?;
    let id = encode_pubkey(alg, key.public_key())?.id();
    Ok((hex::encode(address), id.to_string()))
}
