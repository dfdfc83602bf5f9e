//! Configuration for the Riptide server.
//!
//! Runtime-configurable settings persisted to disk as RON, with CLI
//! overrides via clap and forward/backward compatible serialization
//! (unknown fields ignored, missing fields defaulted).

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, NetworkConfig, ServerConfig};
pub use error::ConfigError;
