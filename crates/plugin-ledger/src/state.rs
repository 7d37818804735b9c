//! `~/.claude.json`: the global state file.
//!
//! Only the MCP-related parts are decoded; the file carries plenty of other
//! state that is ignored.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::Result;
use crate::mcp::McpServerMap;
use crate::read::{load_or_default, null_as_default};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeState {
    /// User-scope MCP servers.
    #[serde(default, deserialize_with = "null_as_default")]
    pub mcp_servers: McpServerMap,
    /// Per-project entries keyed by absolute project path.
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: BTreeMap<String, ProjectState>,
    #[serde(default)]
    pub claude_in_chrome_default_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    #[serde(default, deserialize_with = "null_as_default")]
    pub mcp_servers: McpServerMap,
    /// Names of servers from `mcpServers` switched off for this project.
    #[serde(default, deserialize_with = "null_as_default")]
    pub disabled_mcp_servers: Vec<String>,
    /// Names of `.mcp.json` servers the user declined for this project.
    #[serde(default, deserialize_with = "null_as_default")]
    pub disabled_mcpjson_servers: Vec<String>,
}

impl ClaudeState {
    /// Entry for a project root, tolerating a trailing separator on either
    /// side. Keys that name the root through a symlink match once both
    /// sides are canonicalized.
    #[must_use]
    pub fn project(&self, root: &Path) -> Option<&ProjectState> {
        let wanted = root.to_string_lossy();
        let wanted = trim_separator(&wanted);
        if let Some((_, state)) = self.projects.iter().find(|(key, _)| trim_separator(key) == wanted) {
            return Some(state);
        }
        let canonical = std::fs::canonicalize(root).ok()?;
        self.projects
            .iter()
            .find(|(key, _)| std::fs::canonicalize(key).is_ok_and(|k| k == canonical))
            .map(|(_, state)| state)
    }
}

fn trim_separator(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() { path } else { trimmed }
}

pub fn parse_claude_state(content: &str) -> Result<ClaudeState> {
    Ok(serde_json::from_str(content)?)
}

#[must_use]
pub fn load_claude_state(path: &Path) -> ClaudeState {
    load_or_default(path, "state", parse_claude_state)
}
