//! # Discovery Configuration
//!
//! Loaded from TOML; every key is optional and falls back to the defaults.
//!
//! ```toml
//! [discovery]
//! listen_addr = "0.0.0.0:30301"
//! signature_algorithm = "hybrid-ed25519-falcon512"
//! expiration_secs = 20
//! max_packet_size = 1280
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use qc_crypto::{algorithm_by_name, Ed25519Sig, HybridSig, SignatureAlgorithm};
use serde::Deserialize;
use thiserror::Error;

use crate::wire::{PacketCodec, MAX_PACKET_SIZE};

/// Default UDP listen address of a bootstrap node.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:30301";

/// Default lifetime of outgoing packets in seconds.
pub const DEFAULT_EXPIRATION_SECS: u64 = 20;

/// Discovery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// UDP address to bind.
    pub listen_addr: SocketAddr,
    /// Registry name of the signature algorithm.
    pub signature_algorithm: String,
    /// Lifetime stamped on outgoing packets.
    pub expiration_secs: u64,
    /// Advisory datagram budget; larger packets are logged, not rejected.
    pub max_packet_size: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 30301)),
            signature_algorithm: HybridSig::NAME.to_string(),
            expiration_secs: DEFAULT_EXPIRATION_SECS,
            max_packet_size: MAX_PACKET_SIZE,
        }
    }
}

impl DiscoveryConfig {
    /// Config suitable for testing: loopback on an ephemeral port, the small
    /// classic scheme.
    pub fn for_testing() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            signature_algorithm: Ed25519Sig::NAME.to_string(),
            expiration_secs: 5,
            max_packet_size: MAX_PACKET_SIZE,
        }
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source: e,
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let dc = file.discovery;
        let defaults = Self::default();

        let config = Self {
            listen_addr: dc.listen_addr.unwrap_or(defaults.listen_addr),
            signature_algorithm: dc
                .signature_algorithm
                .unwrap_or(defaults.signature_algorithm),
            expiration_secs: dc.expiration_secs.unwrap_or(defaults.expiration_secs),
            max_packet_size: dc.max_packet_size.unwrap_or(defaults.max_packet_size),
        };

        // Fail at load time rather than at first use
        config.algorithm()?;
        Ok(config)
    }

    /// Resolve the configured signature algorithm.
    pub fn algorithm(&self) -> Result<Arc<dyn SignatureAlgorithm>, ConfigError> {
        algorithm_by_name(&self.signature_algorithm)
            .ok_or_else(|| ConfigError::UnknownAlgorithm(self.signature_algorithm.clone()))
    }

    /// Packet codec for the configured algorithm and datagram budget.
    pub fn packet_codec(&self) -> Result<PacketCodec, ConfigError> {
        Ok(PacketCodec::with_packet_budget(
            self.algorithm()?,
            self.max_packet_size,
        ))
    }
}

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    discovery: DiscoveryConfigFile,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DiscoveryConfigFile {
    listen_addr: Option<SocketAddr>,
    signature_algorithm: Option<String>,
    expiration_secs: Option<u64>,
    max_packet_size: Option<usize>,
}

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path of the file that failed to load.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Algorithm name not in the registry.
    #[error("Unknown signature algorithm {0:?}")]
    UnknownAlgorithm(String),
}
