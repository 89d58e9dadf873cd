pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "pasted")]
#[command(about = "Pastebin daemon with reversible transform chains and pluggable storage")]
pub struct Args {
    /// Base URL of the daemon's HTTP server (defaults to `domain` from the config)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the config file (defaults to ~/.pasted/config.toml)
    #[arg(long = "config", global = true, env = "PASTED_CONFIG")]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
