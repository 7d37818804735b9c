//! Discovery of Claude Code capabilities: skills, agent profiles and MCP
//! servers, across the global, plugin and project scopes.
//!
//! ## Modules
//!
//! - [`frontmatter`] - Tolerant parser for markdown frontmatter
//! - [`discovery`] - Concurrent coordinators producing sorted record lists
//! - [`resolve`] - Installed plugin resolution and enablement
//! - [`scan`] - Per-scope filesystem scanners
//! - [`refresh`] - Snapshots with single-flight refresh
//! - [`config`] - Tool configuration
//!
//! ```no_run
//! use capability_locate::{Discovery, DiscoveryOptions};
//!
//! # async fn run() -> capability_locate::Result<()> {
//! let discovery = Discovery::detect()?;
//! for skill in discovery.discover_skills(&DiscoveryOptions::default()).await {
//!     println!("{} ({})", skill.name, skill.source);
//! }
//! # Ok(())
//! # }
//! ```

mod component;
pub mod config;
pub mod discovery;
mod error;
pub mod frontmatter;
pub mod refresh;
pub mod resolve;
pub mod scan;
mod types;

pub use component::{
    AgentDescriptor, Endpoint, SkillDescriptor, SkillMetadata, parse_agent_descriptor,
    parse_skill_descriptor, resolve_endpoint,
};
pub use config::ToolConfig;
pub use discovery::{Discovery, DiscoveryOptions, McpDiscoveryOptions};
pub use error::{Error, Result};
pub use refresh::{Refresher, Snapshot};
pub use resolve::{
    AbsentPolicy, PluginResolver, ResolvedInstall, SettingsCache, compare_versions,
    find_latest_version,
};
pub use types::{
    AgentProfile, Capability, McpServerEntry, McpSource, Provenance, RecordId, Skill, Source,
    Transport, compare_records, sort_and_dedupe,
};
