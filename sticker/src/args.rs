use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Sticker generation gateway
#[derive(Debug, Parser)]
#[command(name = "sticker", about = "Sticker generation gateway with multi-provider fallback")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "sticker.toml", env = "STICKER_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "STICKER_LISTEN")]
    pub listen: Option<SocketAddr>,
}
