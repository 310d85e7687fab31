//! Command-line flags and their resolution into a config and a key source.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use qc_crypto::{KeyCodec, PrivateKey, SignatureAlgorithm};
use qc_discv4::DiscoveryConfig;

/// QC-Bootnode: Discovery v4 bootstrap node
#[derive(Parser, Debug)]
#[command(name = "qc-bootnode")]
#[command(about = "Bootstrap node for the discovery v4 protocol")]
pub struct Args {
    /// Listen address; `:PORT` listens on every interface [default: :30301]
    #[arg(long, value_name = "ADDR")]
    pub addr: Option<String>,

    /// Generate a node key and write it to FILE
    #[arg(long, value_name = "FILE")]
    pub genkey: Option<PathBuf>,

    /// Write out the node's address and ID, then quit
    #[arg(long)]
    pub writeaddress: bool,

    /// Private key file
    #[arg(long, value_name = "FILE")]
    pub nodekey: Option<PathBuf>,

    /// Private key as hex (for testing)
    #[arg(long, value_name = "HEX")]
    pub nodekeyhex: Option<String>,

    /// TOML config file with a [discovery] section
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Signature algorithm (ed25519, hybrid-ed25519-falcon512)
    #[arg(long, value_name = "NAME")]
    pub sigalg: Option<String>,

    /// Log verbosity (0-5); RUST_LOG takes precedence
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(0..=5))]
    pub verbosity: u8,
}

/// Where the node key comes from.
pub enum KeySource {
    /// Fresh key, persisted to the path.
    Generate(PathBuf),
    /// Key file on disk.
    File(PathBuf),
    /// Hex given on the command line.
    Hex(String),
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generate(path) => f.debug_tuple("Generate").field(path).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Hex(_) => f.write_str("Hex([REDACTED])"),
        }
    }
}

impl KeySource {
    /// Produce the private key, persisting it first when generating.
    pub fn obtain(&self, codec: &KeyCodec) -> Result<PrivateKey> {
        match self {
            Self::Generate(path) => {
                let key = codec
                    .algorithm()
                    .generate_key()
                    .context("could not generate key")?;
                codec
                    .save_private_key_to_file(path, &key)
                    .with_context(|| format!("--genkey {}", path.display()))?;
                Ok(key)
            }
            Self::File(path) => codec
                .load_private_key_from_file(path)
                .with_context(|| format!("--nodekey {}", path.display())),
            Self::Hex(hex) => codec.hex_to_private_key(hex).context("--nodekeyhex"),
        }
    }
}

impl Args {
    /// Pick the key source. `--genkey` wins; otherwise exactly one of
    /// `--nodekey` and `--nodekeyhex` must be set.
    pub fn key_source(&self) -> Result<KeySource> {
        if let Some(path) = &self.genkey {
            return Ok(KeySource::Generate(path.clone()));
        }
        match (&self.nodekey, &self.nodekeyhex) {
            (None, None) => bail!("Use --nodekey or --nodekeyhex to specify a private key"),
            (Some(_), Some(_)) => bail!("Options --nodekey and --nodekeyhex are mutually exclusive"),
            (Some(path), None) => Ok(KeySource::File(path.clone())),
            (None, Some(hex)) => Ok(KeySource::Hex(hex.clone())),
        }
    }

    /// Config file (or defaults) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<DiscoveryConfig> {
        let mut config = match &self.config {
            Some(path) => DiscoveryConfig::load(path)?,
            None => DiscoveryConfig::default(),
        };

        if let Some(addr) = &self.addr {
            config.listen_addr = parse_listen_addr(addr)?;
        }
        if let Some(name) = &self.sigalg {
            config.signature_algorithm = name.clone();
            config.algorithm()?;
        }
        Ok(config)
    }
}

/// Parse `host:port`, accepting `:port` for the unspecified IPv4 address.
pub fn parse_listen_addr(addr: &str) -> Result<SocketAddr> {
    let full = match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => addr.to_string(),
    };
    full.parse()
        .with_context(|| format!("invalid listen address {:?}", addr))
}

/// Default `tracing` filter for a verbosity level.
pub fn log_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "off",
        1 => "error",
        2 => "warn",
        3 => "info",
        4 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use qc_crypto::{Ed25519Sig, SignatureAlgorithm};

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("qc-bootnode").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--nodekey", "node.key"]);
        assert_eq!(args.verbosity, 3);
        assert!(!args.writeaddress);

        let config = args.resolve_config().unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:30301".parse().unwrap());
    }

    #[test]
    fn test_verbosity_range() {
        assert!(Args::try_parse_from(["qc-bootnode", "--verbosity", "6"]).is_err());
        assert_eq!(parse(&["--verbosity", "5"]).verbosity, 5);
    }

    #[test]
    fn test_key_source_requires_exactly_one() {
        let err = parse(&[]).key_source().unwrap_err();
        assert!(err.to_string().contains("--nodekey or --nodekeyhex"));

        let err = parse(&["--nodekey", "a", "--nodekeyhex", "00"])
            .key_source()
            .unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));

        assert!(matches!(
            parse(&["--nodekey", "a"]).key_source().unwrap(),
            KeySource::File(_)
        ));
        assert!(matches!(
            parse(&["--nodekeyhex", "00"]).key_source().unwrap(),
            KeySource::Hex(_)
        ));
    }

    #[test]
    fn test_genkey_takes_precedence() {
        let args = parse(&["--genkey", "new.key", "--nodekey", "old.key"]);
        assert!(matches!(args.key_source().unwrap(), KeySource::Generate(_)));
    }

    #[test]
    fn test_hex_source_is_redacted() {
        let debug = format!("{:?}", KeySource::Hex("deadbeef".into()));
        assert!(!debug.contains("deadbeef"));
    }

    #[test]
    fn test_generate_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.key");
        let codec = KeyCodec::new(Arc::new(Ed25519Sig::new()));

        let generated = KeySource::Generate(path.clone()).obtain(&codec).unwrap();
        let loaded = KeySource::File(path).obtain(&codec).unwrap();
        assert_eq!(generated.public_key(), loaded.public_key());

        let hex = codec.private_key_to_hex(&generated).unwrap();
        let from_hex = KeySource::Hex(hex).obtain(&codec).unwrap();
        assert_eq!(from_hex.public_key(), generated.public_key());
    }

    #[test]
    fn test_missing_key_file_names_flag() {
        let codec = KeyCodec::new(Arc::new(Ed25519Sig::new()));
        let err = KeySource::File("/nonexistent/node.key".into())
            .obtain(&codec)
            .unwrap_err();
        assert!(err.to_string().contains("--nodekey"));
    }

    #[test]
    fn test_parse_listen_addr() {
        assert_eq!(
            parse_listen_addr(":30301").unwrap(),
            "0.0.0.0:30301".parse().unwrap()
        );
        assert_eq!(
            parse_listen_addr("127.0.0.1:4000").unwrap(),
            "127.0.0.1:4000".parse().unwrap()
        );
        assert_eq!(parse_listen_addr("[::1]:9").unwrap().port(), 9);
        assert!(parse_listen_addr("30301").is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = parse(&["--addr", ":4000", "--sigalg", "ed25519", "--nodekey", "k"]);
        let config = args.resolve_config().unwrap();
        assert_eq!(config.listen_addr.port(), 4000);
        assert_eq!(config.algorithm().unwrap().name(), Ed25519Sig::NAME);
    }

    #[test]
    fn test_unknown_sigalg_rejected() {
        let args = parse(&["--sigalg", "rsa", "--nodekey", "k"]);
        assert!(args.resolve_config().is_err());
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(0), "off");
        assert_eq!(log_filter(3), "info");
        assert_eq!(log_filter(5), "trace");
    }
}
