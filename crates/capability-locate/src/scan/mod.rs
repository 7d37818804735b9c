//! Filesystem scanners, one per record kind and scope.
//!
//! Scanners never fail. Missing directories are normal and yield nothing;
//! unreadable or malformed files are logged and skipped without affecting
//! their siblings.

mod agents;
mod mcp;
mod skills;

use std::path::{Path, PathBuf};

use plugin_ledger::read_optional;
use tracing::{debug, warn};

use crate::resolve::ResolvedInstall;
use crate::types::{Provenance, RecordId, Source};

pub use agents::{scan_agents_dir, scan_global_agents, scan_plugin_agents, scan_project_agents};
pub use mcp::{
    BUILT_IN_CHROME, scan_builtin_mcp, scan_global_mcp, scan_plugin_mcp, scan_project_mcp,
};
pub use skills::{
    SKILL_FILE, scan_global_skills, scan_plugin_skills, scan_project_skills, scan_skills_dir,
};

/// The scope a scanned directory belongs to.
#[derive(Debug, Clone, Copy)]
pub enum Origin<'a> {
    Global,
    Project(&'a Path),
    Plugin(&'a ResolvedInstall),
}

impl Origin<'_> {
    #[must_use]
    pub fn source(&self) -> Source {
        match self {
            Origin::Global => Source::Global,
            Origin::Project(_) => Source::Project,
            Origin::Plugin(_) => Source::Plugin,
        }
    }

    /// Id for a record named `leaf` (directory name or file stem).
    #[must_use]
    pub fn record_id(&self, leaf: &str) -> RecordId {
        match self {
            Origin::Global => RecordId::from_parts(["global", leaf]),
            Origin::Project(root) => {
                RecordId::from_parts(["project", &*root.to_string_lossy(), leaf])
            }
            Origin::Plugin(install) => install.record_id(leaf),
        }
    }

    #[must_use]
    pub fn provenance(&self) -> Provenance {
        match self {
            Origin::Global => Provenance::default(),
            Origin::Project(root) => Provenance {
                project_root: Some(root.to_path_buf()),
                ..Provenance::default()
            },
            Origin::Plugin(install) => install.provenance(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            Origin::Plugin(install) => install.is_enabled,
            _ => true,
        }
    }
}

/// Immediate entries of `dir` accepted by `keep`, sorted by path.
fn list_dir(dir: &Path, keep: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "directory does not exist");
            return Vec::new();
        }
        Err(err) => {
            warn!(dir = %dir.display(), "cannot read directory: {err}");
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| keep(path))
        .collect();
    paths.sort();
    paths
}

/// Reads a file that is expected to exist; failures are logged.
fn read_logged(path: &Path) -> Option<String> {
    match read_optional(path) {
        Ok(Some(content)) => Some(content),
        Ok(None) => {
            debug!(path = %path.display(), "file vanished while scanning");
            None
        }
        Err(err) => {
            warn!("{err}");
            None
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
