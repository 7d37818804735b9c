//! Core type definitions for capability discovery.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use plugin_ledger::InstallScope;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::component::SkillMetadata;

const ID_SEPARATOR: char = ':';
const ID_ESCAPE: char = '\\';

/// Stable identifier of a record within its kind.
///
/// Built from provenance components joined with `:`. Separator and escape
/// characters inside a component are backslash-escaped, so distinct
/// component lists always give distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut id = String::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                id.push(ID_SEPARATOR);
            }
            for c in part.as_ref().chars() {
                if c == ID_SEPARATOR || c == ID_ESCAPE {
                    id.push(ID_ESCAPE);
                }
                id.push(c);
            }
        }
        Self(id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a skill or agent profile comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Source {
    Global,
    Plugin,
    Project,
}

impl Source {
    /// Sort bucket: project, then plugin, then global.
    #[must_use]
    pub fn sort_order(self) -> u8 {
        match self {
            Source::Project => 0,
            Source::Plugin => 1,
            Source::Global => 2,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Global => "global",
            Source::Plugin => "plugin",
            Source::Project => "project",
        }
    }
}

/// Where an MCP server entry comes from.
///
/// Plugin-provided servers are reported as [`McpSource::Global`] with plugin
/// provenance attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum McpSource {
    Global,
    Project,
    BuiltIn,
}

impl McpSource {
    /// Sort bucket: project, then global, then built-in.
    #[must_use]
    pub fn sort_order(self) -> u8 {
        match self {
            McpSource::Project => 0,
            McpSource::Global => 1,
            McpSource::BuiltIn => 2,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            McpSource::Global => "global",
            McpSource::Project => "project",
            McpSource::BuiltIn => "builtIn",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for McpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MCP server communication mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Stdio,
    Http,
    Sse,
}

impl Transport {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Stdio => "stdio",
            Transport::Http => "http",
            Transport::Sse => "sse",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plugin and project attribution of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// Providing plugin, for plugin records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_name: Option<String>,
    /// Marketplace the plugin was installed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketplace_name: Option<String>,
    /// Repository backing that marketplace, as `owner/repo` when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketplace_repo: Option<String>,
    /// Project the record belongs to, for project records and project or
    /// local plugin installs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,
    /// Scope that installed the plugin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_scope: Option<InstallScope>,
}

/// A skill (`SKILL.md` directory).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Skill {
    /// Stable identifier, unique within one discovery result.
    pub id: RecordId,
    /// Declared `name`, or the skill directory name.
    pub name: String,
    /// Declared `description`, or the first body paragraph.
    pub description: String,
    /// Scope the record was found in.
    pub source: Source,
    /// Plugin records follow the governing settings file; others are always
    /// enabled.
    pub is_enabled: bool,
    #[serde(flatten)]
    pub provenance: Provenance,
    /// The skill directory.
    pub path: PathBuf,
    /// Optional frontmatter fields.
    pub metadata: SkillMetadata,
}

/// An agent profile (markdown file under `agents/`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct AgentProfile {
    /// Stable identifier, unique within one discovery result.
    pub id: RecordId,
    /// Declared `name`, or the file stem.
    pub name: String,
    /// Declared `description`, or the first body paragraph.
    pub description: String,
    /// Scope the record was found in.
    pub source: Source,
    /// Plugin records follow the governing settings file; others are always
    /// enabled.
    pub is_enabled: bool,
    #[serde(flatten)]
    pub provenance: Provenance,
    /// The markdown file.
    pub path: PathBuf,
    /// Tools the agent may use; empty means inherit all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
    /// Model override, e.g. `sonnet` or `inherit`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// UI color hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// An MCP server declaration.
///
/// Only the key names of `env` and `headers` are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct McpServerEntry {
    pub id: RecordId,
    /// Key of the server in its map.
    pub name: String,
    /// The command line or url.
    pub description: String,
    pub source: McpSource,
    pub transport: Transport,
    /// Executable for `stdio` servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Endpoint for `http` and `sse` servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Names of the declared environment variables, never their values.
    #[serde(default)]
    pub env_keys: Vec<String>,
    /// Names of the declared HTTP headers, never their values.
    #[serde(default)]
    pub header_keys: Vec<String>,
    /// Plugin servers follow the governing settings file; others are
    /// enabled.
    pub is_enabled: bool,
    /// Listed in the project's `disabledMcpServers` / `disabledMcpjsonServers`.
    #[serde(default)]
    pub disabled_in_project: bool,
    /// Built-in servers: whether the harness turns them on by default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_enabled: Option<bool>,
    #[serde(flatten)]
    pub provenance: Provenance,
    /// The config file declaring the server.
    pub path: PathBuf,
}

/// Common view over record kinds used for ordering and deduplication.
pub trait Capability {
    fn id(&self) -> &RecordId;
    fn name(&self) -> &str;
    fn sort_order(&self) -> u8;
    fn path(&self) -> &Path;
}

macro_rules! capability_impls {
    ($ty:ty) => {
        impl Capability for $ty {
            fn id(&self) -> &RecordId {
                &self.id
            }
            fn name(&self) -> &str {
                &self.name
            }
            fn sort_order(&self) -> u8 {
                self.source.sort_order()
            }
            fn path(&self) -> &Path {
                &self.path
            }
        }

        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $ty {}

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
    };
}

capability_impls!(Skill);
capability_impls!(AgentProfile);
capability_impls!(McpServerEntry);

/// Case-insensitive name order, exact spelling as tie-break.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Total order over records: sort bucket, name, id, path.
pub fn compare_records<T: Capability>(a: &T, b: &T) -> Ordering {
    a.sort_order()
        .cmp(&b.sort_order())
        .then_with(|| compare_names(a.name(), b.name()))
        .then_with(|| a.id().cmp(b.id()))
        .then_with(|| a.path().cmp(b.path()))
}

/// Sorts records and drops id collisions, keeping the first record in order.
pub fn sort_and_dedupe<T: Capability>(mut records: Vec<T>) -> Vec<T> {
    records.sort_by(compare_records);
    let mut seen = HashSet::new();
    records.retain(|record| {
        if seen.insert(record.id().clone()) {
            return true;
        }
        warn!(id = %record.id(), path = %record.path().display(), "dropping record with duplicate id");
        false
    });
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(id: &[&str], name: &str, source: Source) -> Skill {
        Skill {
            id: RecordId::from_parts(id),
            name: name.to_string(),
            description: String::new(),
            source,
            is_enabled: true,
            provenance: Provenance::default(),
            path: PathBuf::from(format!("/skills/{name}")),
            metadata: SkillMetadata::default(),
        }
    }

    #[test]
    fn id_joins_parts() {
        assert_eq!(RecordId::from_parts(["plugin", "a@m", "user"]).as_str(), "plugin:a@m:user");
    }

    #[test]
    fn id_escapes_separator_inside_components() {
        let a = RecordId::from_parts(["project", "C:", "x"]);
        let b = RecordId::from_parts(["project", "C", ":x"]);
        let c = RecordId::from_parts(["project", "C\\", "x"]);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
        assert_eq!(a.as_str(), "project:C\\::x");
    }

    #[test]
    fn id_changes_with_any_component() {
        let base = ["plugin", "p@m", "project", "/work/a", "lint"];
        let id = RecordId::from_parts(base);
        for i in 0..base.len() {
            let mut changed = base.map(str::to_string);
            changed[i].push('x');
            assert_ne!(RecordId::from_parts(&changed), id);
        }
        assert_eq!(RecordId::from_parts(base), id);
    }

    #[test]
    fn records_compare_by_id_only() {
        let a = skill(&["global", "x"], "One", Source::Global);
        let mut b = a.clone();
        b.name = "Other".into();
        b.is_enabled = false;
        assert_eq!(a, b);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn sort_orders_by_bucket_then_name() {
        let records = vec![
            skill(&["global", "b"], "beta", Source::Global),
            skill(&["plugin", "z"], "Zeta", Source::Plugin),
            skill(&["global", "a"], "Alpha", Source::Global),
            skill(&["project", "y"], "yak", Source::Project),
            skill(&["plugin", "c"], "charlie", Source::Plugin),
        ];
        let names: Vec<_> = sort_and_dedupe(records)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["yak", "charlie", "Zeta", "Alpha", "beta"]);
    }

    #[test]
    fn sort_and_dedupe_keeps_first_in_order() {
        let records = vec![
            skill(&["global", "dup"], "b-name", Source::Global),
            skill(&["global", "dup"], "a-name", Source::Global),
        ];
        let kept = sort_and_dedupe(records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "a-name");
    }

    #[test]
    fn mcp_sort_order() {
        assert!(McpSource::Project.sort_order() < McpSource::Global.sort_order());
        assert!(McpSource::Global.sort_order() < McpSource::BuiltIn.sort_order());
        assert_eq!(serde_json::to_string(&McpSource::BuiltIn).unwrap(), "\"builtIn\"");
    }

    #[test]
    fn skill_serializes_flat_provenance() {
        let mut s = skill(&["plugin", "p"], "p", Source::Plugin);
        s.provenance.plugin_name = Some("p".into());
        s.provenance.plugin_scope = Some(InstallScope::Local);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["pluginName"], "p");
        assert_eq!(json["pluginScope"], "local");
        assert_eq!(json["isEnabled"], true);
        assert!(json.get("marketplaceRepo").is_none());
    }
}
