// SPDX-License-Identifier: MIT
//
// n-bbs — a telnet board with a full-screen message editor.
//
// This is the binary that wires the crates to the network:
//
//   n-term   → key decoding, ANSI output, render instructions
//   n-editor → the word-wrapped editor and its views
//
// Startup: parse the command line, load the JSON config, install logging,
// then hand the config to the telnet server, which runs until killed.

mod config;
mod registry;
mod server;
mod session;
mod telnet;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// A telnet board with a full-screen message editor.
#[derive(Debug, Parser)]
#[command(name = "n-bbs", version)]
struct Args {
    /// JSON configuration file [default: ./n-bbs.json if present]
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Telnet port, overriding the configuration
    #[arg(short, long)]
    port: Option<u16>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (mut config, source) =
        Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(port) = args.port {
        config.servers.telnet.port = port;
    }

    init_logging(&config.log_level);
    info!(%source, "configuration loaded");

    config.validate().context("invalid configuration")?;
    if !config.servers.telnet.enabled {
        bail!("no servers configured");
    }

    let port = config.servers.telnet.port;
    server::run(Arc::new(config)).with_context(|| format!("telnet server on port {port}"))
}

/// Log to stderr. `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
