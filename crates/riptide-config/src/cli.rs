//! Command-line argument parsing for the Riptide server.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Riptide server command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "riptide", about = "Riptide game server")]
pub struct CliArgs {
    /// Server name shown in discovery responses.
    #[arg(long)]
    pub name: Option<String>,

    /// Address the transport binds to.
    #[arg(long)]
    pub bind: Option<String>,

    /// UDP port the transport listens on.
    #[arg(long)]
    pub port: Option<u16>,

    /// Maximum number of players.
    #[arg(long)]
    pub max_players: Option<u32>,

    /// Whether the server answers discovery probes.
    #[arg(long)]
    pub discoverable: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to the config file (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref name) = args.name {
            self.server.name = name.clone();
        }
        if let Some(ref bind) = args.bind {
            self.network.bind_address = bind.clone();
        }
        if let Some(port) = args.port {
            self.network.port = port;
        }
        if let Some(max_players) = args.max_players {
            self.server.max_players = max_players;
        }
        if let Some(discoverable) = args.discoverable {
            self.network.discoverable = discoverable;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
