//! Errors raised while loading or persisting the server config.

use std::path::PathBuf;

/// Why a config file could not be loaded or written.
///
/// I/O and parse failures carry the offending path so the startup error the
/// operator sees names the actual file, not just the underlying cause.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("cannot read config at {path}: {source}")]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The config could not be written back to disk.
    #[error("cannot write config to {path}: {source}")]
    Write {
        /// Path that was being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid RON for the config schema.
    #[error("invalid RON in {path}: {source}")]
    Parse {
        /// Path of the malformed file.
        path: PathBuf,
        /// Position and cause of the parse failure.
        #[source]
        source: ron::error::SpannedError,
    },

    /// The in-memory config could not be rendered as RON.
    #[error("cannot serialize config: {0}")]
    Serialize(#[source] ron::Error),
}
