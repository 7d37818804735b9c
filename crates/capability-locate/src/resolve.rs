//! Plugin resolution: which installed plugin versions exist on disk, which
//! scope owns them, and whether they are enabled.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

use claude_locate::{ClaudeLayout, Scope};
use plugin_ledger::{
    EnablementMap, InstallScope, InstalledPlugins, PluginInstallEntry, PluginKey, PluginManifest,
    load_enablement, load_installed_plugins, load_known_marketplaces, read_manifest,
};
use regex::Regex;
use tracing::debug;

use crate::types::{Provenance, RecordId};

static SEMVER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+").expect("valid regex"));

/// Verdict for a plugin key missing from the governing settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsentPolicy {
    Enabled,
    Disabled,
}

impl AbsentPolicy {
    #[must_use]
    pub fn apply(self, setting: Option<bool>) -> bool {
        setting.unwrap_or(self == AbsentPolicy::Enabled)
    }
}

/// One install of a plugin whose version directory was found on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInstall {
    pub key: PluginKey,
    pub scope: InstallScope,
    pub project_path: Option<PathBuf>,
    /// The version directory actually used; may differ from the ledger when
    /// the recorded one no longer exists.
    pub install_path: PathBuf,
    pub version: Option<String>,
    pub is_enabled: bool,
    pub marketplace_repo: Option<String>,
    pub manifest: PluginManifest,
}

impl ResolvedInstall {
    #[must_use]
    pub fn provenance(&self) -> Provenance {
        Provenance {
            plugin_name: Some(self.key.plugin.clone()),
            marketplace_name: Some(self.key.marketplace.clone()),
            marketplace_repo: self.marketplace_repo.clone(),
            project_root: self.project_path.clone(),
            plugin_scope: Some(self.scope),
        }
    }

    /// Id of a record named `leaf` provided by this install.
    #[must_use]
    pub fn record_id(&self, leaf: &str) -> RecordId {
        let project = self
            .project_path
            .as_deref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        RecordId::from_parts([
            "plugin",
            self.key.to_string().as_str(),
            self.scope.as_str(),
            project.as_str(),
            leaf,
        ])
    }
}

/// Lazily loaded enablement maps for one resolution pass.
#[derive(Debug)]
pub struct SettingsCache<'a> {
    layout: &'a ClaudeLayout,
    global: EnablementMap,
    project: HashMap<(PathBuf, InstallScope), EnablementMap>,
}

impl<'a> SettingsCache<'a> {
    /// Reads the global settings file immediately; project files on demand.
    #[must_use]
    pub fn new(layout: &'a ClaudeLayout) -> Self {
        let global = load_enablement(&layout.settings_file(&Scope::Global));
        Self::with_global(layout, global)
    }

    #[must_use]
    pub fn with_global(layout: &'a ClaudeLayout, global: EnablementMap) -> Self {
        Self {
            layout,
            global,
            project: HashMap::new(),
        }
    }

    /// The explicit setting governing `entry`, if any.
    pub fn setting(&mut self, entry: &PluginInstallEntry) -> Option<bool> {
        let root = match (entry.scope, entry.project_path.as_deref()) {
            (InstallScope::User, _) => return self.global.get(&entry.key),
            (_, Some(root)) => root,
            (_, None) => return None,
        };
        let layout = self.layout;
        self.project
            .entry((root.to_path_buf(), entry.scope))
            .or_insert_with(|| {
                let file = match entry.scope {
                    InstallScope::Local => layout.local_settings_file(root),
                    _ => layout.settings_file(&Scope::Project(root.to_path_buf())),
                };
                load_enablement(&file)
            })
            .get(&entry.key)
    }
}

/// Resolves installed plugins for one discovery pass.
#[derive(Debug, Clone, Copy)]
pub struct PluginResolver<'a> {
    layout: &'a ClaudeLayout,
    policy: AbsentPolicy,
}

impl<'a> PluginResolver<'a> {
    #[must_use]
    pub fn new(layout: &'a ClaudeLayout, policy: AbsentPolicy) -> Self {
        Self { layout, policy }
    }

    /// Reads the ledger, marketplaces and settings, and resolves every install.
    #[must_use]
    pub fn resolve(&self) -> Vec<ResolvedInstall> {
        let installed = load_installed_plugins(&self.layout.installed_plugins_file());
        if installed.entries.is_empty() {
            return Vec::new();
        }
        let repos = load_known_marketplaces(&self.layout.known_marketplaces_file()).repos();
        let mut settings = SettingsCache::new(self.layout);
        self.resolve_with(&installed, &mut settings, &repos)
    }

    /// Resolves `installed` against already loaded inputs.
    ///
    /// Installs whose version directory cannot be found, or lacks a plugin
    /// manifest, are skipped. Several installs may share one directory.
    pub fn resolve_with(
        &self,
        installed: &InstalledPlugins,
        settings: &mut SettingsCache<'_>,
        repos: &BTreeMap<String, String>,
    ) -> Vec<ResolvedInstall> {
        installed
            .entries
            .iter()
            .filter_map(|entry| {
                let Some((install_path, manifest)) = self.version_dir(entry) else {
                    debug!(plugin = %entry.key, path = %entry.install_path.display(), "no valid version directory");
                    return None;
                };
                let version = entry
                    .version
                    .clone()
                    .or_else(|| manifest.version.clone())
                    .or_else(|| {
                        install_path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                    });
                Some(ResolvedInstall {
                    key: entry.key.clone(),
                    scope: entry.scope,
                    project_path: entry.project_path.clone(),
                    is_enabled: self.policy.apply(settings.setting(entry)),
                    marketplace_repo: repos.get(&entry.key.marketplace).cloned(),
                    install_path,
                    version,
                    manifest,
                })
            })
            .collect()
    }

    /// The directory to scan for `entry`, with its manifest.
    ///
    /// A recorded path that still exists must itself be valid. A missing one
    /// falls back to the newest sibling version.
    fn version_dir(&self, entry: &PluginInstallEntry) -> Option<(PathBuf, PluginManifest)> {
        if entry.install_path.is_dir() {
            let manifest = read_manifest(&entry.install_path)?;
            return Some((entry.install_path.clone(), manifest));
        }

        let versions = entry
            .install_path
            .parent()
            .filter(|p| p.is_dir())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| {
                self.layout
                    .plugin_versions_dir(&entry.key.marketplace, &entry.key.plugin)
            });
        let latest = find_latest_version(&versions)?;
        debug!(plugin = %entry.key, path = %latest.display(), "recorded install path missing, using latest version");
        let manifest = read_manifest(&latest)?;
        Some((latest, manifest))
    }
}

/// Numeric component-wise version comparison.
///
/// Each `.`-separated segment contributes its leading digit run (zero when
/// there is none); missing trailing components count as zero.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a = version_components(a);
    let b = version_components(b);
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn version_components(name: &str) -> Vec<u64> {
    name.split('.')
        .map(|segment| {
            let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

/// Picks the newest version directory directly inside `dir`.
///
/// The highest version wins when it looks like `X.Y.Z`; otherwise the most
/// recently modified directory wins. Hidden directories are ignored.
#[must_use]
pub fn find_latest_version(dir: &Path) -> Option<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), "cannot list versions: {err}");
            return None;
        }
    };

    let mut versions: Vec<(String, PathBuf)> = entries
        .flatten()
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            (!name.starts_with('.')).then(|| (name, e.path()))
        })
        .collect();

    if versions.len() <= 1 {
        return versions.pop().map(|(_, path)| path);
    }

    versions.sort_by(|(a, _), (b, _)| compare_versions(b, a).then_with(|| b.cmp(a)));
    if SEMVER_PREFIX.is_match(&versions[0].0) {
        return Some(versions.swap_remove(0).1);
    }

    let modified = |path: &Path| {
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH)
    };
    versions
        .into_iter()
        .map(|(name, path)| (modified(&path), name, path))
        .max_by(|(ta, na, _), (tb, nb, _)| ta.cmp(tb).then_with(|| na.cmp(nb)))
        .map(|(_, _, path)| path)
}
