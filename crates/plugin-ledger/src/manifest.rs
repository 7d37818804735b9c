//! Plugin manifests under `.claude-plugin/`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::Result;
use crate::read::read_optional;

pub const MANIFEST_DIR: &str = ".claude-plugin";
pub const PLUGIN_MANIFEST: &str = "plugin.json";
pub const MARKETPLACE_MANIFEST: &str = "marketplace.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Plugin,
    Marketplace,
}

/// The parts of `plugin.json` discovery reads; other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    /// Fallback when the install ledger records no version.
    #[serde(default)]
    pub version: Option<String>,
    /// Inline server map, or a path to a separate file.
    #[serde(default)]
    pub mcp_servers: Option<Value>,
}

pub fn parse_plugin_manifest(content: &str) -> Result<PluginManifest> {
    Ok(serde_json::from_str(content)?)
}

/// Locates the manifest that makes `dir` a valid plugin version directory.
#[must_use]
pub fn find_manifest(dir: &Path) -> Option<(ManifestKind, PathBuf)> {
    let manifest_dir = dir.join(MANIFEST_DIR);
    [
        (ManifestKind::Plugin, PLUGIN_MANIFEST),
        (ManifestKind::Marketplace, MARKETPLACE_MANIFEST),
    ]
    .into_iter()
    .map(|(kind, file)| (kind, manifest_dir.join(file)))
    .find(|(_, path)| path.is_file())
}

/// Reads the manifest of a plugin version directory.
///
/// Returns `None` when the directory has no recognised manifest. A manifest
/// that exists but does not decode still marks the directory as valid and
/// yields an empty [`PluginManifest`].
#[must_use]
pub fn read_manifest(dir: &Path) -> Option<PluginManifest> {
    let Some((kind, path)) = find_manifest(dir) else {
        debug!(dir = %dir.display(), "no plugin manifest");
        return None;
    };
    if kind == ManifestKind::Marketplace {
        return Some(PluginManifest::default());
    }

    let manifest = match read_optional(&path) {
        Ok(Some(content)) => parse_plugin_manifest(&content).unwrap_or_else(|err| {
            warn!(path = %path.display(), "malformed plugin manifest: {err}");
            PluginManifest::default()
        }),
        Ok(None) => PluginManifest::default(),
        Err(err) => {
            warn!("{err}");
            PluginManifest::default()
        }
    };
    Some(manifest)
}
