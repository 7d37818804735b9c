//! `caplocate`: list the skills, agent profiles and MCP servers Claude Code
//! can see from the global, plugin and project scopes.
//!
//! Exit codes: 0 on success, 1 when discovery cannot be set up (unknown or
//! planned agent, bad config, missing project path), 2 on usage errors.

mod cli;
mod render;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use capability_locate::{
    Discovery, DiscoveryOptions, McpDiscoveryOptions, Provenance, ToolConfig,
};
use clap::Parser;
use claude_locate::HarnessKind;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, Common, McpScope, RecordScope};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ToolConfig::load_from(path)?,
        None => ToolConfig::load()?,
    };
    debug!(?config, "loaded configuration");

    match cli.command {
        Command::Skills(args) => {
            let session = Session::open(&args.common, &config)?;
            let mut skills = session
                .discovery
                .discover_skills(&session.record_options(args.scope))
                .await;
            skills.retain(|s| session.keeps(&s.provenance));
            render::skills(&mut io::stdout().lock(), &skills, args.common.json)?;
        }
        Command::Profiles(args) => {
            let session = Session::open(&args.common, &config)?;
            let mut agents = session
                .discovery
                .discover_agents(&session.record_options(args.scope))
                .await;
            agents.retain(|a| session.keeps(&a.provenance));
            render::profiles(&mut io::stdout().lock(), &agents, args.common.json)?;
        }
        Command::Mcp(args) => {
            let session = Session::open(&args.common, &config)?;
            let mut servers = session
                .discovery
                .discover_mcp_servers(&session.mcp_options(args.scope))
                .await;
            servers.retain(|s| session.keeps(&s.provenance));
            render::mcp_servers(&mut io::stdout().lock(), &servers, args.common.json)?;
        }
        Command::Agents(args) => {
            render::agents(&mut io::stdout().lock(), HarnessKind::ALL, args.json)?;
        }
    }
    io::stdout().flush()?;
    Ok(())
}

/// Discovery target and project selection for one listing command.
struct Session {
    discovery: Discovery,
    projects: Vec<PathBuf>,
    /// Projects were named on the command line; hide other project-bound
    /// records.
    filter_projects: bool,
    timeout: Option<Duration>,
}

impl Session {
    fn open(common: &Common, config: &ToolConfig) -> Result<Self> {
        let kind: HarnessKind = common.agent.parse()?;
        let discovery = Discovery::for_agent(kind, config)?;
        let filter_projects = !common.projects.is_empty();
        let projects = if filter_projects {
            common
                .projects
                .iter()
                .map(|p| resolve_project(p))
                .collect::<Result<Vec<_>>>()?
        } else {
            config.project_paths.clone()
        };
        Ok(Self {
            discovery,
            projects,
            filter_projects,
            timeout: config.scanner_timeout(),
        })
    }

    /// Project roots recorded by Claude Code may name a project through a
    /// symlink, so a raw mismatch is retried on the canonical path.
    fn keeps(&self, provenance: &Provenance) -> bool {
        let Some(root) = provenance.project_root.as_ref() else {
            return true;
        };
        !self.filter_projects
            || self.projects.contains(root)
            || std::fs::canonicalize(root).is_ok_and(|real| self.projects.contains(&real))
    }

    fn record_options(&self, scope: Option<RecordScope>) -> DiscoveryOptions {
        let wants = |s: RecordScope| scope.is_none_or(|chosen| chosen == s);
        DiscoveryOptions {
            include_global: wants(RecordScope::Global),
            include_plugins: wants(RecordScope::Plugin),
            include_project: wants(RecordScope::Project),
            project_paths: self.projects.clone(),
            timeout: self.timeout,
        }
    }

    /// Plugin servers are reported under the global scope.
    fn mcp_options(&self, scope: Option<McpScope>) -> McpDiscoveryOptions {
        let wants = |s: McpScope| scope.is_none_or(|chosen| chosen == s);
        McpDiscoveryOptions {
            include_global: wants(McpScope::Global),
            include_plugins: wants(McpScope::Global),
            include_built_in: wants(McpScope::BuiltIn),
            include_project: wants(McpScope::Project),
            project_paths: self.projects.clone(),
            timeout: self.timeout,
        }
    }
}

fn resolve_project(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path)
        .with_context(|| format!("project path {} is not accessible", path.display()))
}
