//! MCP server scanners.
//!
//! Sources, in merge order:
//! - project: `projects[<root>].mcpServers` in the state file, then
//!   `<root>/.mcp.json` for names not declared there
//! - global: `mcpServers` in the state file
//! - plugin: `<installPath>/.mcp.json` and inline `mcpServers` in
//!   `plugin.json`
//! - built-in servers shipped with Claude Code

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use claude_locate::ClaudeLayout;
use plugin_ledger::{
    ClaudeState, MANIFEST_DIR, McpServerMap, PLUGIN_MANIFEST, RawMcpServer, load_mcp_json,
    parse_mcp_json,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::component::{Endpoint, expand_plugin_root, resolve_endpoint};
use crate::resolve::ResolvedInstall;
use crate::types::{McpServerEntry, McpSource, Provenance, RecordId, Transport};

/// Browser automation server bundled with Claude Code.
pub const BUILT_IN_CHROME: &str = "claude-in-chrome";

/// Shared fields of the entries produced from one config file.
struct Declared<'a> {
    source: McpSource,
    path: &'a Path,
    provenance: Provenance,
    is_enabled: bool,
}

impl Declared<'_> {
    fn entry(&self, id: RecordId, name: &str, endpoint: Endpoint) -> McpServerEntry {
        McpServerEntry {
            id,
            name: name.to_string(),
            description: endpoint.describe(),
            source: self.source,
            transport: endpoint.transport,
            command: endpoint.command,
            args: endpoint.args,
            url: endpoint.url,
            env_keys: endpoint.env_keys,
            header_keys: endpoint.header_keys,
            is_enabled: self.is_enabled,
            disabled_in_project: false,
            default_enabled: None,
            provenance: self.provenance.clone(),
            path: self.path.to_path_buf(),
        }
    }
}

/// Decodes every entry of a server map, dropping the ones that do not
/// describe a reachable server.
fn endpoints(servers: &McpServerMap, path: &Path) -> Vec<(String, Endpoint)> {
    servers
        .iter()
        .filter_map(|(name, value)| {
            let raw = match RawMcpServer::from_value(value) {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(server = %name, path = %path.display(), "skipping malformed MCP server: {err}");
                    return None;
                }
            };
            resolve_endpoint(name, &raw).map(|endpoint| (name.clone(), endpoint))
        })
        .collect()
}

/// User-scope servers from the state file.
///
/// `disabled_in_project` is set when any of `project_roots` lists the server
/// in its `disabledMcpServers`.
#[must_use]
pub fn scan_global_mcp(
    layout: &ClaudeLayout,
    state: &ClaudeState,
    project_roots: &[PathBuf],
) -> Vec<McpServerEntry> {
    let path = layout.state_file();
    let disabled: HashSet<&str> = project_roots
        .iter()
        .filter_map(|root| state.project(root))
        .flat_map(|project| project.disabled_mcp_servers.iter().map(String::as_str))
        .collect();
    let declared = Declared {
        source: McpSource::Global,
        path,
        provenance: Provenance::default(),
        is_enabled: true,
    };

    endpoints(&state.mcp_servers, path)
        .into_iter()
        .map(|(name, endpoint)| {
            let mut entry = declared.entry(RecordId::from_parts(["global", name.as_str()]), &name, endpoint);
            entry.disabled_in_project = disabled.contains(name.as_str());
            entry
        })
        .collect()
}

/// Servers bound to one project root.
///
/// State-file entries come first; `.mcp.json` entries are added only when
/// no server with the same id was declared in the state file.
#[must_use]
pub fn scan_project_mcp(
    layout: &ClaudeLayout,
    state: &ClaudeState,
    root: &Path,
) -> Vec<McpServerEntry> {
    let id = |name: &str| RecordId::from_parts(["project", &*root.to_string_lossy(), name]);
    let provenance = Provenance {
        project_root: Some(root.to_path_buf()),
        ..Provenance::default()
    };
    let project = state.project(root);
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    if let Some(project) = project {
        let declared = Declared {
            source: McpSource::Project,
            path: layout.state_file(),
            provenance: provenance.clone(),
            is_enabled: true,
        };
        for (name, endpoint) in endpoints(&project.mcp_servers, layout.state_file()) {
            let mut entry = declared.entry(id(&name), &name, endpoint);
            entry.disabled_in_project = project.disabled_mcp_servers.contains(&name);
            seen.insert(entry.id.clone());
            entries.push(entry);
        }
    }

    let mcp_file = layout.project_mcp_file(root);
    let declared = Declared {
        source: McpSource::Project,
        path: &mcp_file,
        provenance,
        is_enabled: true,
    };
    let disabled_json: &[String] = project
        .map(|p| p.disabled_mcpjson_servers.as_slice())
        .unwrap_or_default();
    for (name, endpoint) in endpoints(&load_mcp_json(&mcp_file), &mcp_file) {
        let entry_id = id(&name);
        if seen.contains(&entry_id) {
            debug!(server = %name, "already declared in state file, skipping .mcp.json entry");
            continue;
        }
        let mut entry = declared.entry(entry_id, &name, endpoint);
        entry.disabled_in_project = disabled_json.contains(&name);
        entries.push(entry);
    }
    entries
}

/// Servers that ship with Claude Code itself.
#[must_use]
pub fn scan_builtin_mcp(layout: &ClaudeLayout, state: &ClaudeState) -> Vec<McpServerEntry> {
    let mut entry = Declared {
        source: McpSource::BuiltIn,
        path: layout.state_file(),
        provenance: Provenance::default(),
        is_enabled: true,
    }
    .entry(
        RecordId::from_parts(["builtIn", BUILT_IN_CHROME]),
        BUILT_IN_CHROME,
        Endpoint {
            transport: Transport::Stdio,
            command: None,
            args: Vec::new(),
            url: None,
            env_keys: Vec::new(),
            header_keys: Vec::new(),
        },
    );
    entry.description = "Browser automation through the Claude in Chrome extension".to_string();
    entry.default_enabled = state.claude_in_chrome_default_enabled;
    vec![entry]
}

/// Server maps a plugin declares, paired with the file declaring them.
fn plugin_server_maps(install: &ResolvedInstall) -> Vec<(PathBuf, McpServerMap)> {
    let root = &install.install_path;
    let mut maps = vec![(root.join(".mcp.json"), load_mcp_json(&root.join(".mcp.json")))];

    let manifest_path = root.join(MANIFEST_DIR).join(PLUGIN_MANIFEST);
    match &install.manifest.mcp_servers {
        None | Some(Value::Null) => {}
        Some(Value::Object(inline)) => {
            // either the bare map or a nested {"mcpServers": {...}}
            let map = match parse_mcp_json(&Value::Object(inline.clone()).to_string()) {
                Ok(map) => map,
                Err(err) => {
                    warn!(path = %manifest_path.display(), "ignoring inline mcpServers: {err}");
                    McpServerMap::new()
                }
            };
            maps.push((manifest_path, map));
        }
        Some(Value::String(relative)) => {
            let file = root.join(relative.trim_start_matches("./"));
            if file != root.join(".mcp.json") {
                let map = load_mcp_json(&file);
                maps.push((file, map));
            }
        }
        Some(other) => {
            warn!(path = %manifest_path.display(), "unexpected mcpServers value: {other}");
        }
    }
    maps
}

/// Servers declared by resolved plugin installs.
///
/// Reported with [`McpSource::Global`] and plugin provenance.
#[must_use]
pub fn scan_plugin_mcp(installs: &[ResolvedInstall]) -> Vec<McpServerEntry> {
    let mut entries = Vec::new();
    for install in installs {
        let mut seen = BTreeSet::new();
        for (path, servers) in plugin_server_maps(install) {
            let declared = Declared {
                source: McpSource::Global,
                path: &path,
                provenance: install.provenance(),
                is_enabled: install.is_enabled,
            };
            for (name, mut endpoint) in endpoints(&servers, &path) {
                if !seen.insert(name.clone()) {
                    continue;
                }
                expand_plugin_root(&mut endpoint, &install.install_path);
                entries.push(declared.entry(install.record_id(&name), &name, endpoint));
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugin_ledger::{InstallScope, PluginManifest, parse_claude_state};
    use serde_json::json;
    use std::fs;

    fn state(value: serde_json::Value) -> ClaudeState {
        parse_claude_state(&value.to_string()).unwrap()
    }

    #[test]
    fn global_servers_keep_only_key_names() {
        let home = tempfile::tempdir().unwrap();
        let layout = ClaudeLayout::from_home(home.path());
        let state = state(json!({
            "mcpServers": {
                "search": {"url": "https://s.example.com", "headers": {"Authorization": "Bearer top-secret"}},
                "db": {"command": "pg", "env": {"API_KEY": "sk-123"}},
                "broken": {"args": []}
            }
        }));

        let entries = scan_global_mcp(&layout, &state, &[]);
        assert_eq!(entries.len(), 2);
        let db = entries.iter().find(|e| e.name == "db").unwrap();
        assert_eq!(db.env_keys, vec!["API_KEY"]);
        assert_eq!(db.transport, Transport::Stdio);
        assert_eq!(db.source, McpSource::Global);
        let json = serde_json::to_string(&entries).unwrap();
        assert!(!json.contains("sk-123"));
        assert!(!json.contains("top-secret"));
    }

    #[test]
    fn global_servers_flagged_by_project_disable_list() {
        let home = tempfile::tempdir().unwrap();
        let layout = ClaudeLayout::from_home(home.path());
        let state = state(json!({
            "mcpServers": {"search": {"url": "u"}, "db": {"command": "pg"}},
            "projects": {"/work/app": {"disabledMcpServers": ["search"]}}
        }));
        let entries = scan_global_mcp(&layout, &state, &[PathBuf::from("/work/app")]);
        let search = entries.iter().find(|e| e.name == "search").unwrap();
        assert!(search.disabled_in_project);
        assert!(search.is_enabled);
        assert!(!entries.iter().find(|e| e.name == "db").unwrap().disabled_in_project);
    }

    #[test]
    fn project_state_wins_over_mcp_json() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let layout = ClaudeLayout::from_home(home.path());
        fs::write(
            project.path().join(".mcp.json"),
            json!({"mcpServers": {"db": {"command": "from-json"}, "lint": {"command": "eslint-mcp"}}})
                .to_string(),
        )
        .unwrap();
        let root = project.path().to_string_lossy().into_owned();
        let state = state(json!({
            "projects": {root: {"mcpServers": {"db": {"command": "from-state"}}, "disabledMcpjsonServers": ["lint"]}}
        }));

        let entries = scan_project_mcp(&layout, &state, project.path());
        assert_eq!(entries.len(), 2);
        let db = entries.iter().find(|e| e.name == "db").unwrap();
        assert_eq!(db.command.as_deref(), Some("from-state"));
        assert_eq!(db.path, layout.state_file());
        let lint = entries.iter().find(|e| e.name == "lint").unwrap();
        assert!(lint.disabled_in_project);
        assert_eq!(lint.path, project.path().join(".mcp.json"));
        assert!(entries.iter().all(|e| e.source == McpSource::Project));
    }

    #[test]
    fn builtin_reports_default_enabled() {
        let home = tempfile::tempdir().unwrap();
        let layout = ClaudeLayout::from_home(home.path());
        let entries = scan_builtin_mcp(&layout, &state(json!({"claudeInChromeDefaultEnabled": true})));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, BUILT_IN_CHROME);
        assert_eq!(entries[0].source, McpSource::BuiltIn);
        assert_eq!(entries[0].default_enabled, Some(true));
    }

    #[test]
    fn plugin_servers_from_file_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("1.0.0");
        fs::create_dir_all(&root).unwrap();
        fs::write(
            root.join(".mcp.json"),
            r#"{"tool": {"command": "${CLAUDE_PLUGIN_ROOT}/bin/tool"}}"#,
        )
        .unwrap();

        let install = ResolvedInstall {
            key: "p@m".parse().unwrap(),
            scope: InstallScope::User,
            project_path: None,
            install_path: root.clone(),
            version: Some("1.0.0".into()),
            is_enabled: false,
            marketplace_repo: Some("acme/m".into()),
            manifest: PluginManifest {
                mcp_servers: Some(json!({"tool": {"command": "dup"}, "remote": {"url": "https://r"}})),
                ..PluginManifest::default()
            },
        };

        let entries = scan_plugin_mcp(std::slice::from_ref(&install));
        assert_eq!(entries.len(), 2);
        let tool = entries.iter().find(|e| e.name == "tool").unwrap();
        assert_eq!(tool.command, Some(format!("{}/bin/tool", root.display())));
        assert!(!tool.is_enabled);
        assert_eq!(tool.source, McpSource::Global);
        assert_eq!(tool.provenance.plugin_name.as_deref(), Some("p"));
        assert_eq!(tool.provenance.marketplace_repo.as_deref(), Some("acme/m"));
        let remote = entries.iter().find(|e| e.name == "remote").unwrap();
        assert_eq!(remote.path, root.join(".claude-plugin/plugin.json"));
    }
}
