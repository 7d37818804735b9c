//! Readers for the JSON files Claude Code keeps about plugins and MCP servers.
//!
//! Every `parse_*` function is pure over the file contents. The `load_*`
//! helpers add the filesystem policy: a missing file is a normal state and
//! yields an empty value, a malformed one is logged and yields an empty value.

mod error;
mod installed;
mod key;
mod manifest;
mod marketplace;
mod mcp;
mod read;
mod settings;
mod state;

pub use error::Error;
pub use installed::{
    InstallScope, InstalledPlugins, PluginInstallEntry, load_installed_plugins,
    parse_installed_plugins,
};
pub use key::PluginKey;
pub use manifest::{
    MANIFEST_DIR, MARKETPLACE_MANIFEST, ManifestKind, PLUGIN_MANIFEST,
    PluginManifest, find_manifest, parse_plugin_manifest, read_manifest,
};
pub use marketplace::{
    KnownMarketplaces, MarketplaceRecord, MarketplaceSource, load_known_marketplaces,
    parse_known_marketplaces,
};
pub use mcp::{McpServerMap, RawMcpServer, load_mcp_json, parse_mcp_json};
pub use read::read_optional;
pub use settings::{EnablementMap, load_enablement, parse_settings};
pub use state::{ClaudeState, ProjectState, load_claude_state, parse_claude_state};

pub type Result<T> = std::result::Result<T, Error>;
