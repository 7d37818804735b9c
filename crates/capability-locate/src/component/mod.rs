//! Declarative component files: skill and agent descriptors, MCP endpoints.

mod agent;
mod mcp;
mod skill;

pub use agent::{AgentDescriptor, parse_agent_descriptor};
pub use mcp::{Endpoint, expand_plugin_root, resolve_endpoint};
pub use skill::{SkillDescriptor, SkillMetadata, parse_skill_descriptor};
