//! Core type definitions.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Configuration scope for path resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// User-level configuration under the home directory.
    Global,
    /// Configuration inside a project root.
    Project(PathBuf),
}

/// Agent harnesses this crate knows about.
///
/// Only [`HarnessKind::ClaudeCode`] has a discovery implementation; the
/// others are listed so front-ends can show what is coming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub enum HarnessKind {
    /// Anthropic's Claude Code CLI.
    #[serde(rename = "claude-code")]
    ClaudeCode,
    /// OpenAI Codex CLI.
    #[serde(rename = "codex")]
    Codex,
    /// OpenCode.
    #[serde(rename = "opencode")]
    OpenCode,
    /// Block's Goose.
    #[serde(rename = "goose")]
    Goose,
    /// Factory Droid.
    #[serde(rename = "droid")]
    Droid,
}

/// Whether discovery is available for a harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarnessStatus {
    Supported,
    Planned,
}

impl HarnessKind {
    /// Every known harness, supported ones first.
    pub const ALL: &'static [HarnessKind] = &[
        HarnessKind::ClaudeCode,
        HarnessKind::Codex,
        HarnessKind::OpenCode,
        HarnessKind::Goose,
        HarnessKind::Droid,
    ];

    /// Stable identifier used on the command line and in config files.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            HarnessKind::ClaudeCode => "claude-code",
            HarnessKind::Codex => "codex",
            HarnessKind::OpenCode => "opencode",
            HarnessKind::Goose => "goose",
            HarnessKind::Droid => "droid",
        }
    }

    /// Human readable name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            HarnessKind::ClaudeCode => "Claude Code",
            HarnessKind::Codex => "Codex CLI",
            HarnessKind::OpenCode => "OpenCode",
            HarnessKind::Goose => "Goose",
            HarnessKind::Droid => "Factory Droid",
        }
    }

    /// Executable name looked up on `PATH`.
    #[must_use]
    pub fn binary_name(self) -> &'static str {
        match self {
            HarnessKind::ClaudeCode => "claude",
            HarnessKind::Codex => "codex",
            HarnessKind::OpenCode => "opencode",
            HarnessKind::Goose => "goose",
            HarnessKind::Droid => "droid",
        }
    }

    #[must_use]
    pub fn status(self) -> HarnessStatus {
        match self {
            HarnessKind::ClaudeCode => HarnessStatus::Supported,
            _ => HarnessStatus::Planned,
        }
    }

    #[must_use]
    pub fn is_supported(self) -> bool {
        self.status() == HarnessStatus::Supported
    }
}

impl fmt::Display for HarnessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for HarnessKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        HarnessKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.slug() == wanted || kind.binary_name() == wanted)
            .ok_or_else(|| Error::UnknownHarness(s.to_string()))
    }
}

impl fmt::Display for HarnessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessStatus::Supported => f.write_str("supported"),
            HarnessStatus::Planned => f.write_str("planned"),
        }
    }
}
