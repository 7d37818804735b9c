//! MCP server endpoint resolution.

use std::path::Path;

use plugin_ledger::RawMcpServer;
use tracing::warn;

use crate::types::Transport;

const PLUGIN_ROOT_VAR: &str = "${CLAUDE_PLUGIN_ROOT}";

/// How to reach an MCP server. Secret-bearing maps keep key names only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub transport: Transport,
    /// Set for `stdio`.
    pub command: Option<String>,
    pub args: Vec<String>,
    /// Set for `http` and `sse`.
    pub url: Option<String>,
    /// Sorted names from `env`.
    pub env_keys: Vec<String>,
    /// Sorted names from `headers`.
    pub header_keys: Vec<String>,
}

impl Endpoint {
    /// One-line summary: the command line, or the url.
    #[must_use]
    pub fn describe(&self) -> String {
        match (&self.command, &self.url) {
            (Some(command), _) if self.args.is_empty() => command.clone(),
            (Some(command), _) => format!("{command} {}", self.args.join(" ")),
            (None, Some(url)) => url.clone(),
            (None, None) => String::new(),
        }
    }
}

fn explicit_transport(name: &str, value: &str) -> Option<Transport> {
    match value.trim().to_ascii_lowercase().as_str() {
        "stdio" => Some(Transport::Stdio),
        "http" | "streamable-http" | "streamablehttp" => Some(Transport::Http),
        "sse" => Some(Transport::Sse),
        other => {
            warn!(server = name, transport = other, "unknown MCP transport, inferring");
            None
        }
    }
}

/// Determines the transport of a server declaration.
///
/// An explicit `type` wins; otherwise `command` means stdio and `url` means
/// http. Declarations with neither are dropped.
#[must_use]
pub fn resolve_endpoint(name: &str, raw: &RawMcpServer) -> Option<Endpoint> {
    let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.trim().is_empty()).map(str::to_string);
    let command = non_empty(&raw.command);
    let url = non_empty(&raw.url);

    let transport = raw
        .transport
        .as_deref()
        .and_then(|t| explicit_transport(name, t))
        .or_else(|| {
            if command.is_some() {
                Some(Transport::Stdio)
            } else if url.is_some() {
                Some(Transport::Http)
            } else {
                None
            }
        });

    let Some(transport) = transport else {
        warn!(server = name, "MCP server has neither command nor url, skipping");
        return None;
    };

    Some(Endpoint {
        transport,
        command,
        args: raw.args.clone(),
        url,
        env_keys: raw.env_keys(),
        header_keys: raw.header_keys(),
    })
}

/// Substitutes `${CLAUDE_PLUGIN_ROOT}` in the command and arguments.
pub fn expand_plugin_root(endpoint: &mut Endpoint, root: &Path) {
    let root = root.to_string_lossy();
    let expand = |s: &mut String| {
        if s.contains(PLUGIN_ROOT_VAR) {
            *s = s.replace(PLUGIN_ROOT_VAR, &root);
        }
    };
    if let Some(command) = endpoint.command.as_mut() {
        expand(command);
    }
    endpoint.args.iter_mut().for_each(expand);
}
