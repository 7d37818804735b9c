//! Text and JSON output.
//!
//! Both formats are produced from the same row structs so they always carry
//! the same fields.

use std::io::{self, Write};
use std::path::Path;

use capability_locate::{AgentProfile, McpServerEntry, Provenance, Skill};
use claude_locate::{Harness, HarnessKind, HarnessStatus};
use serde::Serialize;

/// `plugin@marketplace (scope)` for plugin-provided records.
fn plugin_label(provenance: &Provenance) -> Option<String> {
    let plugin = provenance.plugin_name.as_deref()?;
    let mut label = match provenance.marketplace_name.as_deref() {
        Some(market) => format!("{plugin}@{market}"),
        None => plugin.to_string(),
    };
    if let Some(scope) = provenance.plugin_scope {
        label.push_str(&format!(" ({scope})"));
    }
    Some(label)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRow<'a> {
    name: &'a str,
    source: String,
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    plugin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    marketplace_repo: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a Path>,
    description: &'a str,
    path: &'a Path,
}

impl<'a> From<&'a Skill> for SkillRow<'a> {
    fn from(skill: &'a Skill) -> Self {
        Self {
            name: &skill.name,
            source: skill.source.to_string(),
            enabled: skill.is_enabled,
            plugin: plugin_label(&skill.provenance),
            marketplace_repo: skill.provenance.marketplace_repo.as_deref(),
            project: skill.provenance.project_root.as_deref(),
            description: &skill.description,
            path: &skill.path,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRow<'a> {
    name: &'a str,
    source: String,
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    plugin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    tools: &'a [String],
    description: &'a str,
    path: &'a Path,
}

impl<'a> From<&'a AgentProfile> for ProfileRow<'a> {
    fn from(agent: &'a AgentProfile) -> Self {
        Self {
            name: &agent.name,
            source: agent.source.to_string(),
            enabled: agent.is_enabled,
            plugin: plugin_label(&agent.provenance),
            project: agent.provenance.project_root.as_deref(),
            model: agent.model.as_deref(),
            tools: &agent.tools,
            description: &agent.description,
            path: &agent.path,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McpRow<'a> {
    name: &'a str,
    source: String,
    transport: String,
    enabled: bool,
    disabled_in_project: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plugin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a Path>,
    target: &'a str,
    env_keys: &'a [String],
    header_keys: &'a [String],
    path: &'a Path,
}

impl<'a> From<&'a McpServerEntry> for McpRow<'a> {
    fn from(server: &'a McpServerEntry) -> Self {
        Self {
            name: &server.name,
            source: server.source.to_string(),
            transport: server.transport.to_string(),
            enabled: server.is_enabled,
            disabled_in_project: server.disabled_in_project,
            default_enabled: server.default_enabled,
            plugin: plugin_label(&server.provenance),
            project: server.provenance.project_root.as_deref(),
            target: &server.description,
            env_keys: &server.env_keys,
            header_keys: &server.header_keys,
            path: &server.path,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRow {
    id: &'static str,
    name: &'static str,
    status: HarnessStatus,
    installed: bool,
}

impl From<HarnessKind> for AgentRow {
    fn from(kind: HarnessKind) -> Self {
        Self {
            id: kind.slug(),
            name: kind.display_name(),
            status: kind.status(),
            installed: Harness::new(kind).is_installed(),
        }
    }
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

fn write_json<W: Write, T: Serialize>(out: &mut W, rows: &[T]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, rows)?;
    writeln!(out)
}

/// Writes skills as text or JSON.
pub fn skills<W: Write>(out: &mut W, skills: &[Skill], json: bool) -> io::Result<()> {
    let rows: Vec<SkillRow<'_>> = skills.iter().map(SkillRow::from).collect();
    if json {
        return write_json(out, &rows);
    }
    if rows.is_empty() {
        return writeln!(out, "No skills found.");
    }
    for row in &rows {
        write!(out, "{}  [{}, {}]", row.name, row.source, enabled_label(row.enabled))?;
        if let Some(plugin) = &row.plugin {
            write!(out, "  {plugin}")?;
        }
        if let Some(repo) = row.marketplace_repo {
            write!(out, "  <{repo}>")?;
        }
        writeln!(out)?;
        if !row.description.is_empty() {
            writeln!(out, "    {}", row.description)?;
        }
        if let Some(project) = row.project {
            writeln!(out, "    project: {}", project.display())?;
        }
        writeln!(out, "    {}", row.path.display())?;
    }
    Ok(())
}

/// Writes agent profiles as text or JSON.
pub fn profiles<W: Write>(out: &mut W, agents: &[AgentProfile], json: bool) -> io::Result<()> {
    let rows: Vec<ProfileRow<'_>> = agents.iter().map(ProfileRow::from).collect();
    if json {
        return write_json(out, &rows);
    }
    if rows.is_empty() {
        return writeln!(out, "No agent profiles found.");
    }
    for row in &rows {
        write!(out, "{}  [{}, {}]", row.name, row.source, enabled_label(row.enabled))?;
        if let Some(plugin) = &row.plugin {
            write!(out, "  {plugin}")?;
        }
        if let Some(model) = row.model {
            write!(out, "  model={model}")?;
        }
        writeln!(out)?;
        if !row.description.is_empty() {
            writeln!(out, "    {}", row.description)?;
        }
        if !row.tools.is_empty() {
            writeln!(out, "    tools: {}", row.tools.join(", "))?;
        }
        if let Some(project) = row.project {
            writeln!(out, "    project: {}", project.display())?;
        }
        writeln!(out, "    {}", row.path.display())?;
    }
    Ok(())
}

/// Writes MCP servers as text or JSON. Only key names of secrets exist here.
pub fn mcp_servers<W: Write>(out: &mut W, servers: &[McpServerEntry], json: bool) -> io::Result<()> {
    let rows: Vec<McpRow<'_>> = servers.iter().map(McpRow::from).collect();
    if json {
        return write_json(out, &rows);
    }
    if rows.is_empty() {
        return writeln!(out, "No MCP servers found.");
    }
    for row in &rows {
        write!(
            out,
            "{}  [{}, {}, {}]",
            row.name,
            row.source,
            row.transport,
            enabled_label(row.enabled)
        )?;
        if row.disabled_in_project {
            write!(out, "  disabled in project")?;
        }
        if let Some(default) = row.default_enabled {
            write!(out, "  default {}", enabled_label(default))?;
        }
        if let Some(plugin) = &row.plugin {
            write!(out, "  {plugin}")?;
        }
        writeln!(out)?;
        if !row.target.is_empty() {
            writeln!(out, "    {}", row.target)?;
        }
        if !row.env_keys.is_empty() {
            writeln!(out, "    env: {}", row.env_keys.join(", "))?;
        }
        if !row.header_keys.is_empty() {
            writeln!(out, "    headers: {}", row.header_keys.join(", "))?;
        }
        if let Some(project) = row.project {
            writeln!(out, "    project: {}", project.display())?;
        }
        writeln!(out, "    {}", row.path.display())?;
    }
    Ok(())
}

/// Writes the harness registry as text or JSON.
pub fn agents<W: Write>(out: &mut W, kinds: &[HarnessKind], json: bool) -> io::Result<()> {
    let rows: Vec<AgentRow> = kinds.iter().copied().map(AgentRow::from).collect();
    if json {
        return write_json(out, &rows);
    }
    for row in &rows {
        let installed = if row.installed { "installed" } else { "not installed" };
        writeln!(out, "{:<12} {:<12} {:<10} {installed}", row.id, row.name, row.status.to_string())?;
    }
    Ok(())
}
