//! Claude Code path layout.
//!
//! Claude Code stores its configuration in:
//! - **Global**: `$CLAUDE_CONFIG_DIR` or `~/.claude/`, plus the state file
//!   `~/.claude.json`
//! - **Project**: `.claude/` in project root, plus `.mcp.json` at the root
//!
//! Installed plugins live under the global directory:
//! `plugins/cache/<marketplace>/<plugin>/<version>/`.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::platform;
use crate::types::Scope;

/// Environment variable for Claude Code config directory override.
const CLAUDE_CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

const STATE_FILE: &str = ".claude.json";
const SETTINGS_FILE: &str = "settings.json";
const LOCAL_SETTINGS_FILE: &str = "settings.local.json";
const PROJECT_MCP_FILE: &str = ".mcp.json";

/// Resolved Claude Code locations for one home directory.
///
/// Every path is computed, never checked for existence; missing files are
/// the scanners' business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaudeLayout {
    home: PathBuf,
    config_dir: PathBuf,
    state_file: PathBuf,
}

impl ClaudeLayout {
    /// Resolves the layout for the current user.
    ///
    /// Checks `CLAUDE_CONFIG_DIR` first (the state file then lives inside
    /// that directory), then falls back to `~/.claude/` and `~/.claude.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn detect() -> Result<Self> {
        let home = platform::home_dir()?;
        if let Ok(dir) = std::env::var(CLAUDE_CONFIG_DIR_ENV) {
            let path = PathBuf::from(dir);
            if path.is_absolute() {
                return Ok(Self::with_config_dir(home, path));
            }
        }
        Ok(Self::from_home(home))
    }

    /// Layout rooted at an explicit home directory.
    #[must_use]
    pub fn from_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            config_dir: home.join(".claude"),
            state_file: home.join(STATE_FILE),
            home,
        }
    }

    /// Layout with an overridden global config directory.
    #[must_use]
    pub fn with_config_dir(home: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            home: home.into(),
            state_file: config_dir.join(STATE_FILE),
            config_dir,
        }
    }

    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Base configuration directory for the scope.
    #[must_use]
    pub fn config_dir(&self, scope: &Scope) -> PathBuf {
        match scope {
            Scope::Global => self.config_dir.clone(),
            Scope::Project(root) => project_config_dir(root),
        }
    }

    /// Skills directory: `<config>/skills/`.
    #[must_use]
    pub fn skills_dir(&self, scope: &Scope) -> PathBuf {
        self.config_dir(scope).join("skills")
    }

    /// Agent profiles directory: `<config>/agents/`.
    #[must_use]
    pub fn agents_dir(&self, scope: &Scope) -> PathBuf {
        self.config_dir(scope).join("agents")
    }

    /// Shared settings file: `<config>/settings.json`.
    #[must_use]
    pub fn settings_file(&self, scope: &Scope) -> PathBuf {
        self.config_dir(scope).join(SETTINGS_FILE)
    }

    /// Untracked project overrides: `<project>/.claude/settings.local.json`.
    #[must_use]
    pub fn local_settings_file(&self, project_root: &Path) -> PathBuf {
        project_config_dir(project_root).join(LOCAL_SETTINGS_FILE)
    }

    /// Repo-local MCP declarations: `<project>/.mcp.json`.
    #[must_use]
    pub fn project_mcp_file(&self, project_root: &Path) -> PathBuf {
        project_root.join(PROJECT_MCP_FILE)
    }

    /// The global state file holding MCP servers and per-project entries.
    #[must_use]
    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    #[must_use]
    pub fn plugins_dir(&self) -> PathBuf {
        self.config_dir.join("plugins")
    }

    /// Root of installed plugin payloads: `plugins/cache/`.
    #[must_use]
    pub fn plugin_cache_dir(&self) -> PathBuf {
        self.plugins_dir().join("cache")
    }

    /// Cache directory holding every downloaded version of one plugin.
    #[must_use]
    pub fn plugin_versions_dir(&self, marketplace: &str, plugin: &str) -> PathBuf {
        self.plugin_cache_dir().join(marketplace).join(plugin)
    }

    #[must_use]
    pub fn installed_plugins_file(&self) -> PathBuf {
        self.plugins_dir().join("installed_plugins.json")
    }

    #[must_use]
    pub fn known_marketplaces_file(&self) -> PathBuf {
        self.plugins_dir().join("known_marketplaces.json")
    }

    /// Returns `true` if the global config directory exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.config_dir.is_dir()
    }
}

/// Returns the project-local Claude Code configuration directory.
///
/// # Arguments
///
/// * `project_root` - Path to the project root directory
#[must_use]
pub fn project_config_dir(project_root: &Path) -> PathBuf {
    project_root.join(".claude")
}

/// Checks if Claude Code is installed on this system.
///
/// Currently checks if the global config directory exists.
pub fn is_installed() -> bool {
    ClaudeLayout::detect().map(|l| l.exists()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_is_absolute() {
        // Skip if home dir cannot be determined (CI environments)
        if platform::home_dir().is_err() {
            return;
        }

        let layout = ClaudeLayout::detect().unwrap();
        assert!(layout.config_dir(&Scope::Global).is_absolute());
        assert!(layout.state_file().ends_with(".claude.json"));
    }

    #[test]
    fn from_home_places_state_file_beside_config_dir() {
        let layout = ClaudeLayout::from_home("/home/u");
        assert_eq!(layout.config_dir(&Scope::Global), PathBuf::from("/home/u/.claude"));
        assert_eq!(layout.state_file(), Path::new("/home/u/.claude.json"));
    }

    #[test]
    fn config_dir_override_moves_state_file() {
        let layout = ClaudeLayout::with_config_dir("/home/u", "/opt/claude");
        assert_eq!(layout.state_file(), Path::new("/opt/claude/.claude.json"));
        assert_eq!(
            layout.installed_plugins_file(),
            PathBuf::from("/opt/claude/plugins/installed_plugins.json")
        );
    }

    #[test]
    fn project_paths_are_relative_to_root() {
        let layout = ClaudeLayout::from_home("/home/u");
        let root = PathBuf::from("/some/project");
        let scope = Scope::Project(root.clone());
        assert_eq!(layout.skills_dir(&scope), PathBuf::from("/some/project/.claude/skills"));
        assert_eq!(layout.agents_dir(&scope), PathBuf::from("/some/project/.claude/agents"));
        assert_eq!(
            layout.settings_file(&scope),
            PathBuf::from("/some/project/.claude/settings.json")
        );
        assert_eq!(
            layout.local_settings_file(&root),
            PathBuf::from("/some/project/.claude/settings.local.json")
        );
        assert_eq!(layout.project_mcp_file(&root), PathBuf::from("/some/project/.mcp.json"));
    }

    #[test]
    fn plugin_paths() {
        let layout = ClaudeLayout::from_home("/home/u");
        assert_eq!(
            layout.plugin_versions_dir("market", "tool"),
            PathBuf::from("/home/u/.claude/plugins/cache/market/tool")
        );
        assert_eq!(
            layout.known_marketplaces_file(),
            PathBuf::from("/home/u/.claude/plugins/known_marketplaces.json")
        );
    }

    #[test]
    fn exists_tracks_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ClaudeLayout::from_home(dir.path());
        assert!(!layout.exists());
        std::fs::create_dir(dir.path().join(".claude")).unwrap();
        assert!(layout.exists());
    }
}
