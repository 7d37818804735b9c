//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "caplocate", version)]
#[command(about = "List the skills, agent profiles and MCP servers Claude Code can see")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file [default: $XDG_CONFIG_HOME/caplocate/config.toml]
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List skills
    Skills(RecordArgs),
    /// List MCP servers
    Mcp(McpArgs),
    /// List agent profiles (subagents)
    Profiles(RecordArgs),
    /// List known agent harnesses and their support status
    Agents(AgentsArgs),
}

/// Options shared by the listing commands.
#[derive(Debug, Args)]
pub struct Common {
    /// Agent harness to inspect
    #[arg(long, default_value = "claude-code")]
    pub agent: String,

    /// Project root to scan; repeat for several. Project-bound records
    /// outside these roots are hidden.
    #[arg(long = "project", value_name = "PATH")]
    pub projects: Vec<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Only show records from this scope
    #[arg(long, value_enum)]
    pub scope: Option<RecordScope>,

    #[command(flatten)]
    pub common: Common,
}

#[derive(Debug, Args)]
pub struct McpArgs {
    /// Only show servers from this scope
    #[arg(long, value_enum)]
    pub scope: Option<McpScope>,

    #[command(flatten)]
    pub common: Common,
}

#[derive(Debug, Args)]
pub struct AgentsArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordScope {
    Global,
    Plugin,
    Project,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum McpScope {
    Global,
    Project,
    BuiltIn,
}
