//! Configuration for the campusnet-web server.

use std::path::PathBuf;

use clap::Parser;

pub(crate) const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// REST server for the campusnet university social network.
///
/// Configuration can be set via CLI arguments or environment variables.
/// CLI arguments take precedence over environment variables.
#[derive(Parser, Debug)]
#[command(name = "campusnet-web", version, about)]
pub struct Cli {
    /// HTTP server bind address [env: CAMPUSNET_BIND] [default: 127.0.0.1:8080]
    #[arg(long, short = 'b')]
    pub bind: Option<String>,

    /// Data directory holding the database [env: CAMPUSNET_HOME] [default: ~/.campusnet]
    #[arg(long, short = 'd')]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Config {
    pub bind_addr: String,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_cli_and_env(cli: Cli) -> Self {
        let data_dir = cli
            .data_dir
            .or_else(|| std::env::var("CAMPUSNET_HOME").ok().map(PathBuf::from))
            .unwrap_or_else(|| {
                std::env::var("HOME")
                    .map(|h| PathBuf::from(h).join(".campusnet"))
                    .unwrap_or_else(|_| PathBuf::from(".campusnet"))
            });

        let bind_addr = cli
            .bind
            .or_else(|| std::env::var("CAMPUSNET_BIND").ok())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        Self {
            bind_addr,
            data_dir,
        }
    }
}
