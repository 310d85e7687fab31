//! QC-Bootnode: Discovery v4 bootstrap node
//!
//! ## Startup Sequence
//!
//! 1. Parse flags, merge with the optional config file
//! 2. Obtain the node key (generate, file, or hex)
//! 3. `--writeaddress`: print address and node ID, quit
//! 4. Bind UDP, print the enode URL, answer pings until Ctrl+C

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::UdpSocket;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use qc_bootnode::cli::{log_filter, Args, KeySource};
use qc_bootnode::identity::{address_and_id, enode_url};
use qc_bootnode::responder::Responder;
use qc_crypto::{KeyCodec, SignatureAlgorithm};
use qc_discv4::SystemTimeSource;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides --verbosity
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(args.verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = args.resolve_config()?;
    let alg = config.algorithm()?;
    info!(algorithm = alg.name(), "signature algorithm selected");

    let source = args.key_source()?;
    let keys = KeyCodec::new(Arc::clone(&alg));
    let key = source.obtain(&keys)?;
    if let KeySource::Generate(path) = &source {
        info!(path = %path.display(), "node key written");
        if !args.writeaddress {
            return Ok(());
        }
    }

    if args.writeaddress {
        let (address, id) = address_and_id(alg.as_ref(), &key)?;
        println!("{}", address);
        println!("{}", id);
        return Ok(());
    }

    let socket = UdpSocket::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    let local = socket.local_addr()?;

    println!("{}", enode_url(alg.as_ref(), &key, local)?);
    println!("Note: you're using cmd/bootnode, a developer tool.");
    println!("We recommend using a regular node as bootstrap node for production deployments.");

    let codec = config.packet_codec()?;
    info!(budget = codec.packet_budget(), "datagram budget");
    let responder = Responder::new(
        codec,
        key,
        config.expiration_secs,
        SystemTimeSource::new(),
    );

    tokio::select! {
        result = responder.run(&socket) => {
            if let Err(e) = &result {
                error!(error = %e, "receive loop failed");
            }
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
        }
    }

    Ok(())
}
