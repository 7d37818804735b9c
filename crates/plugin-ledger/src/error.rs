use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("invalid plugin key '{0}': expected <plugin>@<marketplace>")]
    InvalidPluginKey(String),

    #[error("unexpected document shape: {0}")]
    Shape(String),
}
