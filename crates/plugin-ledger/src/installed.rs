//! `plugins/installed_plugins.json`.
//!
//! Version 2 of the file maps each plugin key to a list of installs, one per
//! scope/project. Version 1 stored a single install object per key with no
//! scope; those are read as user-scope installs.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::read::{load_or_default, null_as_default};
use crate::{PluginKey, Result};

/// Which settings hierarchy installed a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallScope {
    /// `~/.claude/settings.json`
    User,
    /// `<project>/.claude/settings.json`
    Project,
    /// `<project>/.claude/settings.local.json`
    Local,
}

impl InstallScope {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InstallScope::User => "user",
            InstallScope::Project => "project",
            InstallScope::Local => "local",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(InstallScope::User),
            "project" => Some(InstallScope::Project),
            "local" => Some(InstallScope::Local),
            _ => None,
        }
    }
}

impl fmt::Display for InstallScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One install of one plugin version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInstallEntry {
    pub key: PluginKey,
    pub scope: InstallScope,
    pub install_path: PathBuf,
    /// Present for `project` and `local` installs.
    pub project_path: Option<PathBuf>,
    pub version: Option<String>,
}

/// Decoded ledger; entries keep file order (keys sorted, installs in order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledPlugins {
    pub version: u32,
    pub entries: Vec<PluginInstallEntry>,
}

#[derive(Debug, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    plugins: BTreeMap<String, InstallSlot>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstallSlot {
    Many(Vec<Value>),
    One(Value),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInstall {
    #[serde(default)]
    scope: Option<String>,
    install_path: PathBuf,
    #[serde(default)]
    project_path: Option<PathBuf>,
    #[serde(default)]
    version: Option<String>,
}

/// Parses the install ledger.
///
/// Individual malformed installs (bad key, unknown scope, missing project
/// path for a project-bound scope) are dropped with a warning; only a file
/// that is not a JSON object fails.
pub fn parse_installed_plugins(content: &str) -> Result<InstalledPlugins> {
    let file: LedgerFile = serde_json::from_str(content)?;
    let mut entries = Vec::new();

    for (raw_key, slot) in file.plugins {
        let key: PluginKey = match raw_key.parse() {
            Ok(key) => key,
            Err(err) => {
                warn!("skipping installed plugin: {err}");
                continue;
            }
        };
        let values = match slot {
            InstallSlot::Many(values) => values,
            InstallSlot::One(value) => vec![value],
        };
        for value in values {
            if let Some(entry) = decode_install(&key, value) {
                entries.push(entry);
            }
        }
    }

    Ok(InstalledPlugins {
        version: file.version.unwrap_or(1),
        entries,
    })
}

fn decode_install(key: &PluginKey, value: Value) -> Option<PluginInstallEntry> {
    let raw: RawInstall = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(plugin = %key, "skipping malformed install entry: {err}");
            return None;
        }
    };

    let scope = match raw.scope.as_deref() {
        None => InstallScope::User,
        Some(s) => match InstallScope::parse(s) {
            Some(scope) => scope,
            None => {
                warn!(plugin = %key, scope = s, "skipping install with unknown scope");
                return None;
            }
        },
    };

    if scope != InstallScope::User && raw.project_path.is_none() {
        warn!(plugin = %key, %scope, "skipping project-bound install without projectPath");
        return None;
    }

    Some(PluginInstallEntry {
        key: key.clone(),
        scope,
        install_path: raw.install_path,
        project_path: raw.project_path,
        version: raw.version,
    })
}

/// Loads the ledger; absent or malformed files give an empty ledger.
#[must_use]
pub fn load_installed_plugins(path: &Path) -> InstalledPlugins {
    load_or_default(path, "installed plugins", parse_installed_plugins)
}
