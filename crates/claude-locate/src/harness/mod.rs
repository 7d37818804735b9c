//! Harness discovery and path resolution.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::types::{HarnessKind, HarnessStatus};

pub mod claude_code;

use claude_code::ClaudeLayout;

/// A known agent harness.
#[derive(Debug)]
pub struct Harness {
    kind: HarnessKind,
}

impl Harness {
    /// Creates a new harness instance for the given kind.
    ///
    /// This does not check if the harness is installed. Use [`is_installed`]
    /// to check installation status.
    ///
    /// [`is_installed`]: Harness::is_installed
    #[must_use]
    pub fn new(kind: HarnessKind) -> Self {
        Self { kind }
    }

    /// Returns the kind of harness.
    #[must_use]
    pub fn kind(&self) -> HarnessKind {
        self.kind
    }

    #[must_use]
    pub fn status(&self) -> HarnessStatus {
        self.kind.status()
    }

    /// Location of the harness executable on `PATH`, if any.
    #[must_use]
    pub fn binary_path(&self) -> Option<PathBuf> {
        which::which(self.kind.binary_name()).ok()
    }

    /// Returns `true` if this harness is installed on the current system.
    ///
    /// Claude Code counts as installed when its global configuration
    /// directory exists or its binary is on `PATH`; other harnesses are
    /// detected by binary only.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        match self.kind {
            HarnessKind::ClaudeCode => claude_code::is_installed() || self.binary_path().is_some(),
            _ => self.binary_path().is_some(),
        }
    }

    /// Resolves the Claude Code layout backing this harness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] for planned harnesses, or an error if
    /// the home directory cannot be determined.
    pub fn claude_layout(&self) -> Result<ClaudeLayout> {
        match self.kind {
            HarnessKind::ClaudeCode => ClaudeLayout::detect(),
            other => Err(Error::Unsupported(other.to_string())),
        }
    }
}
