//! MCP server maps as found in `.mcp.json`, `~/.claude.json` and plugin
//! manifests.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::Value;

use crate::read::load_or_default;
use crate::{Error, Result};

/// Server name → undecoded server object.
///
/// Entries stay as raw JSON until [`RawMcpServer::from_value`] so one bad entry
/// cannot spoil its siblings.
pub type McpServerMap = BTreeMap<String, Value>;

/// One MCP server declaration.
///
/// `env` and `headers` only retain their key names; the values are never
/// materialised.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMcpServer {
    #[serde(rename = "type", default)]
    pub transport: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, IgnoredAny>,
    #[serde(default)]
    pub headers: BTreeMap<String, IgnoredAny>,
}

impl RawMcpServer {
    /// Decodes one server object.
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::Shape("MCP server entry must be an object".into()));
        }
        Ok(Self::deserialize(value)?)
    }

    #[must_use]
    pub fn env_keys(&self) -> Vec<String> {
        self.env.keys().cloned().collect()
    }

    #[must_use]
    pub fn header_keys(&self) -> Vec<String> {
        self.headers.keys().cloned().collect()
    }
}

/// Parses an `.mcp.json` document.
///
/// Accepts the wrapped form `{"mcpServers": {...}}` as well as a bare map of
/// server name → server object.
pub fn parse_mcp_json(content: &str) -> Result<McpServerMap> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Object(mut root) = value else {
        return Err(Error::Shape(".mcp.json must be an object".into()));
    };

    match root.remove("mcpServers") {
        Some(Value::Object(servers)) => Ok(servers.into_iter().collect()),
        Some(Value::Null) => Ok(McpServerMap::new()),
        Some(_) => Err(Error::Shape("'mcpServers' must be an object".into())),
        None if root.values().all(Value::is_object) => Ok(root.into_iter().collect()),
        None => Err(Error::Shape("no 'mcpServers' object".into())),
    }
}

#[must_use]
pub fn load_mcp_json(path: &Path) -> McpServerMap {
    load_or_default(path, ".mcp.json", parse_mcp_json)
}
