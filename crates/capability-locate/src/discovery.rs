//! Discovery coordinators.
//!
//! Each coordinator turns its options into independent units of work (one
//! per scope scanner, one per project root), runs them concurrently on the
//! blocking pool and merges the results into one sorted, deduplicated list.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use claude_locate::{ClaudeLayout, Harness, HarnessKind};
use plugin_ledger::{ClaudeState, load_claude_state};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::ToolConfig;
use crate::error::{Error, Result};
use crate::resolve::{AbsentPolicy, PluginResolver, ResolvedInstall};
use crate::scan::{
    scan_builtin_mcp, scan_global_agents, scan_global_mcp, scan_global_skills, scan_plugin_agents,
    scan_plugin_mcp, scan_plugin_skills, scan_project_agents, scan_project_mcp,
    scan_project_skills,
};
use crate::types::{AgentProfile, Capability, McpServerEntry, Skill, sort_and_dedupe};

/// A labelled scanner invocation.
type Unit<T> = (String, Box<dyn FnOnce() -> Vec<T> + Send + 'static>);

fn unit<T, F>(label: impl Into<String>, scan: F) -> Unit<T>
where
    F: FnOnce() -> Vec<T> + Send + 'static,
{
    (label.into(), Box::new(scan))
}

/// Which scopes a skill or agent profile discovery covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    pub include_global: bool,
    pub include_plugins: bool,
    pub include_project: bool,
    pub project_paths: Vec<PathBuf>,
    /// Per-scanner time limit; a scanner exceeding it contributes nothing.
    pub timeout: Option<Duration>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            include_global: true,
            include_plugins: true,
            include_project: true,
            project_paths: Vec::new(),
            timeout: None,
        }
    }
}

impl DiscoveryOptions {
    /// All scopes, with project roots and timeout taken from `config`.
    #[must_use]
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            project_paths: config.project_paths.clone(),
            timeout: config.scanner_timeout(),
            ..Self::default()
        }
    }
}

/// Which scopes an MCP server discovery covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpDiscoveryOptions {
    pub include_global: bool,
    pub include_plugins: bool,
    pub include_built_in: bool,
    pub include_project: bool,
    pub project_paths: Vec<PathBuf>,
    pub timeout: Option<Duration>,
}

impl Default for McpDiscoveryOptions {
    fn default() -> Self {
        Self {
            include_global: true,
            include_plugins: true,
            include_built_in: true,
            include_project: true,
            project_paths: Vec::new(),
            timeout: None,
        }
    }
}

impl McpDiscoveryOptions {
    #[must_use]
    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            project_paths: config.project_paths.clone(),
            timeout: config.scanner_timeout(),
            ..Self::default()
        }
    }
}

/// Scanner functions for one record kind.
struct Scanners<T> {
    kind: &'static str,
    policy: AbsentPolicy,
    global: fn(&ClaudeLayout) -> Vec<T>,
    plugin: fn(&[ResolvedInstall]) -> Vec<T>,
    project: fn(&ClaudeLayout, &Path) -> Vec<T>,
}

/// A discovery session over one Claude Code layout.
///
/// Holds no cached state; every call reads the filesystem afresh.
#[derive(Debug, Clone)]
pub struct Discovery {
    layout: Arc<ClaudeLayout>,
}

impl Discovery {
    #[must_use]
    pub fn new(layout: ClaudeLayout) -> Self {
        Self {
            layout: Arc::new(layout),
        }
    }

    /// Session for the current user's Claude Code configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn detect() -> Result<Self> {
        Ok(Self::new(ClaudeLayout::detect()?))
    }

    /// Session for an agent harness, checked against the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AgentDisabled`] if `kind` is not listed in
    /// `enabled_agents`, or an unsupported-harness error for planned agents.
    pub fn for_agent(kind: HarnessKind, config: &ToolConfig) -> Result<Self> {
        if !config.is_enabled(kind) {
            return Err(Error::AgentDisabled(kind.slug().to_string()));
        }
        Ok(Self::new(Harness::new(kind).claude_layout()?))
    }

    #[must_use]
    pub fn layout(&self) -> &ClaudeLayout {
        &self.layout
    }

    /// Skills from every requested scope.
    ///
    /// Plugin skills missing from the governing settings file are disabled.
    pub async fn discover_skills(&self, options: &DiscoveryOptions) -> Vec<Skill> {
        let scanners = Scanners {
            kind: "skills",
            policy: AbsentPolicy::Disabled,
            global: scan_global_skills,
            plugin: scan_plugin_skills,
            project: scan_project_skills,
        };
        gather(self.scope_units(options, &scanners), options.timeout).await
    }

    /// Agent profiles from every requested scope.
    ///
    /// Plugin agents missing from the governing settings file are enabled.
    pub async fn discover_agents(&self, options: &DiscoveryOptions) -> Vec<AgentProfile> {
        let scanners = Scanners {
            kind: "agents",
            policy: AbsentPolicy::Enabled,
            global: scan_global_agents,
            plugin: scan_plugin_agents,
            project: scan_project_agents,
        };
        gather(self.scope_units(options, &scanners), options.timeout).await
    }

    /// MCP servers from every requested scope.
    ///
    /// The state file is read once and shared by the scanners that need it.
    pub async fn discover_mcp_servers(&self, options: &McpDiscoveryOptions) -> Vec<McpServerEntry> {
        let layout = Arc::clone(&self.layout);
        let state = match tokio::task::spawn_blocking(move || load_claude_state(layout.state_file()))
            .await
        {
            Ok(state) => Arc::new(state),
            Err(err) => {
                warn!("reading state file failed: {err}");
                Arc::new(ClaudeState::default())
            }
        };

        let mut units: Vec<Unit<McpServerEntry>> = Vec::new();
        if options.include_global {
            let (layout, state) = (Arc::clone(&self.layout), Arc::clone(&state));
            let roots = options.project_paths.clone();
            units.push(unit("global mcp", move || scan_global_mcp(&layout, &state, &roots)));
        }
        if options.include_plugins {
            let layout = Arc::clone(&self.layout);
            units.push(unit("plugin mcp", move || {
                let installs = PluginResolver::new(&layout, AbsentPolicy::Enabled).resolve();
                scan_plugin_mcp(&installs)
            }));
        }
        if options.include_built_in {
            let (layout, state) = (Arc::clone(&self.layout), Arc::clone(&state));
            units.push(unit("built-in mcp", move || scan_builtin_mcp(&layout, &state)));
        }
        if options.include_project {
            for root in &options.project_paths {
                let (layout, state) = (Arc::clone(&self.layout), Arc::clone(&state));
                let root = root.clone();
                units.push(unit(format!("project mcp {}", root.display()), move || {
                    scan_project_mcp(&layout, &state, &root)
                }));
            }
        }
        gather(units, options.timeout).await
    }

    fn scope_units<T: 'static>(
        &self,
        options: &DiscoveryOptions,
        scanners: &Scanners<T>,
    ) -> Vec<Unit<T>> {
        let mut units = Vec::new();
        if options.include_global {
            let layout = Arc::clone(&self.layout);
            let scan = scanners.global;
            units.push(unit(format!("global {}", scanners.kind), move || scan(&layout)));
        }
        if options.include_plugins {
            let layout = Arc::clone(&self.layout);
            let (scan, policy) = (scanners.plugin, scanners.policy);
            units.push(unit(format!("plugin {}", scanners.kind), move || {
                scan(&PluginResolver::new(&layout, policy).resolve())
            }));
        }
        if options.include_project {
            for root in &options.project_paths {
                let layout = Arc::clone(&self.layout);
                let root = root.clone();
                let scan = scanners.project;
                let label = format!("project {} {}", scanners.kind, root.display());
                units.push(unit(label, move || scan(&layout, &root)));
            }
        }
        units
    }
}

/// Runs every unit on the blocking pool and merges the results.
///
/// A unit that panics or exceeds `timeout` is logged and contributes
/// nothing. The merged list is sorted and deduplicated by id, so completion
/// order does not matter.
pub(crate) async fn gather<T>(units: Vec<Unit<T>>, timeout: Option<Duration>) -> Vec<T>
where
    T: Capability + Send + 'static,
{
    let mut set = JoinSet::new();
    for (label, scan) in units {
        set.spawn(async move {
            let task = tokio::task::spawn_blocking(scan);
            let joined = match timeout {
                Some(limit) => match tokio::time::timeout(limit, task).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        warn!(unit = %label, "scanner timed out after {limit:?}");
                        return Vec::new();
                    }
                },
                None => task.await,
            };
            match joined {
                Ok(records) => {
                    debug!(unit = %label, count = records.len(), "scanner finished");
                    records
                }
                Err(err) => {
                    warn!(unit = %label, "scanner failed: {err}");
                    Vec::new()
                }
            }
        });
    }

    let mut records = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(batch) => records.extend(batch),
            Err(err) => warn!("scanner task failed: {err}"),
        }
    }
    sort_and_dedupe(records)
}
