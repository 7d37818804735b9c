//! Tool configuration: `$XDG_CONFIG_HOME/caplocate/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use claude_locate::HarnessKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

const CONFIG_DIR: &str = "caplocate";
const CONFIG_FILE: &str = "config.toml";

/// Settings read once at the start of a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Agents discovery may be run for.
    pub enabled_agents: Vec<HarnessKind>,
    /// Project roots scanned when none are given on the command line.
    pub project_paths: Vec<PathBuf>,
    /// Upper bound for a single scanner, in milliseconds.
    pub scanner_timeout_ms: Option<u64>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            enabled_agents: vec![HarnessKind::ClaudeCode],
            project_paths: Vec::new(),
            scanner_timeout_ms: None,
        }
    }
}

impl ToolConfig {
    /// Default location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        Ok(claude_locate::platform::config_home()?
            .join(CONFIG_DIR)
            .join(CONFIG_FILE))
    }

    /// Loads the config from its default location.
    ///
    /// # Errors
    ///
    /// See [`ToolConfig::load_from`].
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Loads the config from `path`; a missing file gives the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file exists but cannot be read, or
    /// [`Error::Config`] if it is not valid TOML for this schema.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(Error::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parses config content; `path` is only used for error messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn scanner_timeout(&self) -> Option<Duration> {
        self.scanner_timeout_ms.map(Duration::from_millis)
    }

    #[must_use]
    pub fn is_enabled(&self, kind: HarnessKind) -> bool {
        self.enabled_agents.contains(&kind)
    }
}
