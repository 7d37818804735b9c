//! Error types for capability discovery.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while setting up discovery.
///
/// Scanning itself never fails; these only surface from configuration and
/// layout resolution.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Home or harness resolution failed.
    #[error(transparent)]
    Locate(#[from] claude_locate::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool configuration file is malformed.
    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The requested agent is not in the configured `enabled_agents`.
    #[error("agent '{0}' is not enabled in the configuration")]
    AgentDisabled(String),
}

/// Result alias for capability discovery.
pub type Result<T> = std::result::Result<T, Error>;
