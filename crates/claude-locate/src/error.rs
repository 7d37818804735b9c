//! Error types for path discovery.

use thiserror::Error;

/// Errors raised while locating harness configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The user's home directory could not be determined.
    #[error("home directory could not be determined")]
    HomeNotFound,

    /// The name does not match any known harness.
    #[error("unknown agent '{0}' (see `caplocate agents`)")]
    UnknownHarness(String),

    /// The harness is known but discovery is not implemented for it.
    #[error("{0} is planned but not supported yet")]
    Unsupported(String),
}

/// Result alias for path discovery.
pub type Result<T> = std::result::Result<T, Error>;
