use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use capability_locate::{
    Discovery, DiscoveryOptions, McpDiscoveryOptions, McpSource, Skill, Source, compare_records,
};
use claude_locate::ClaudeLayout;
use plugin_ledger::InstallScope;
use serde_json::{Value, json};
use tempfile::TempDir;

struct Fixture {
    home: TempDir,
    project: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().unwrap(),
            project: tempfile::tempdir().unwrap(),
        }
    }

    fn layout(&self) -> ClaudeLayout {
        ClaudeLayout::from_home(self.home.path())
    }

    fn discovery(&self) -> Discovery {
        Discovery::new(self.layout())
    }

    fn config(&self) -> PathBuf {
        self.home.path().join(".claude")
    }

    fn project(&self) -> &Path {
        self.project.path()
    }

    fn options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            project_paths: vec![self.project().to_path_buf()],
            ..DiscoveryOptions::default()
        }
    }

    fn mcp_options(&self) -> McpDiscoveryOptions {
        McpDiscoveryOptions {
            project_paths: vec![self.project().to_path_buf()],
            ..McpDiscoveryOptions::default()
        }
    }

    fn write(&self, path: impl AsRef<Path>, content: &str) {
        let path = path.as_ref();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn write_json(&self, path: impl AsRef<Path>, value: Value) {
        self.write(path, &serde_json::to_string_pretty(&value).unwrap());
    }

    fn skill(&self, skills_dir: &Path, dir: &str, name: &str) {
        self.write(
            skills_dir.join(dir).join("SKILL.md"),
            &format!("---\nname: {name}\ndescription: The {name} skill\n---\n\nBody.\n"),
        );
    }

    /// Creates a plugin version directory with one skill, one agent and one
    /// MCP server.
    fn plugin_version(&self, plugin: &str, marketplace: &str, version: &str) -> PathBuf {
        let root = self
            .config()
            .join("plugins/cache")
            .join(marketplace)
            .join(plugin)
            .join(version);
        self.write_json(
            root.join(".claude-plugin/plugin.json"),
            json!({"name": plugin, "version": version}),
        );
        self.skill(&root.join("skills"), &format!("{plugin}-skill"), &format!("{plugin}-skill"));
        self.write(
            root.join("agents").join(format!("{plugin}-agent.md")),
            "---\ndescription: Plugin agent\n---\n",
        );
        self.write_json(
            root.join(".mcp.json"),
            json!({"mcpServers": {format!("{plugin}-mcp"): {"command": "${CLAUDE_PLUGIN_ROOT}/server"}}}),
        );
        root
    }

    fn installed(&self, plugins: Value) {
        self.write_json(
            self.config().join("plugins/installed_plugins.json"),
            json!({"version": 2, "plugins": plugins}),
        );
    }

    fn global_settings(&self, enabled: Value) {
        self.write_json(self.config().join("settings.json"), json!({"enabledPlugins": enabled}));
    }
}

fn set_mtime(path: &Path, secs: u64) {
    let time = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
    fs::File::open(path).unwrap().set_modified(time).unwrap();
}

fn names(skills: &[Skill]) -> Vec<&str> {
    skills.iter().map(|s| s.name.as_str()).collect()
}

#[tokio::test]
async fn empty_home_discovers_nothing_but_builtins() {
    let fx = Fixture::new();
    let discovery = fx.discovery();
    assert!(discovery.discover_skills(&fx.options()).await.is_empty());
    assert!(discovery.discover_agents(&fx.options()).await.is_empty());

    let servers = discovery.discover_mcp_servers(&fx.mcp_options()).await;
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].source, McpSource::BuiltIn);
}

#[tokio::test]
async fn skills_from_all_scopes_are_sorted() {
    let fx = Fixture::new();
    fx.skill(&fx.config().join("skills"), "zeta", "zeta");
    fx.skill(&fx.config().join("skills"), "alpha", "Alpha");
    fx.skill(&fx.project().join(".claude/skills"), "local", "local-tool");
    let install = fx.plugin_version("review", "acme", "1.0.0");
    fx.installed(json!({"review@acme": [{"scope": "user", "installPath": install}]}));
    fx.global_settings(json!({"review@acme": true}));

    let skills = fx.discovery().discover_skills(&fx.options()).await;
    assert_eq!(names(&skills), vec!["local-tool", "review-skill", "Alpha", "zeta"]);
    assert_eq!(
        skills.iter().map(|s| s.source).collect::<Vec<_>>(),
        vec![Source::Project, Source::Plugin, Source::Global, Source::Global]
    );
    assert!(skills.windows(2).all(|w| compare_records(&w[0], &w[1]).is_le()));

    let ids: HashSet<_> = skills.iter().map(|s| s.id.clone()).collect();
    assert_eq!(ids.len(), skills.len());
}

#[tokio::test]
async fn discovery_is_idempotent() {
    let fx = Fixture::new();
    fx.skill(&fx.config().join("skills"), "one", "one");
    fx.skill(&fx.project().join(".claude/skills"), "two", "two");
    let install = fx.plugin_version("review", "acme", "1.0.0");
    fx.installed(json!({"review@acme": [{"scope": "user", "installPath": install}]}));

    let discovery = fx.discovery();
    let first = serde_json::to_value(discovery.discover_skills(&fx.options()).await).unwrap();
    let second = serde_json::to_value(discovery.discover_skills(&fx.options()).await).unwrap();
    assert_eq!(first, second);

    let first = serde_json::to_value(discovery.discover_mcp_servers(&fx.mcp_options()).await).unwrap();
    let second = serde_json::to_value(discovery.discover_mcp_servers(&fx.mcp_options()).await).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn disabled_plugin_records_are_reported_disabled() {
    let fx = Fixture::new();
    let install = fx.plugin_version("review", "acme", "1.0.0");
    fx.installed(json!({"review@acme": [{"scope": "user", "installPath": install}]}));
    fx.global_settings(json!({"review@acme": false}));

    let discovery = fx.discovery();
    let skills = discovery.discover_skills(&fx.options()).await;
    assert_eq!(skills.len(), 1);
    assert!(!skills[0].is_enabled);
    assert_eq!(skills[0].provenance.plugin_name.as_deref(), Some("review"));
    assert_eq!(skills[0].provenance.marketplace_name.as_deref(), Some("acme"));

    let agents = discovery.discover_agents(&fx.options()).await;
    assert_eq!(agents.len(), 1);
    assert!(!agents[0].is_enabled);

    let servers = discovery.discover_mcp_servers(&fx.mcp_options()).await;
    let plugin_server = servers.iter().find(|s| s.name == "review-mcp").unwrap();
    assert!(!plugin_server.is_enabled);
    assert_eq!(plugin_server.source, McpSource::Global);
}

#[tokio::test]
async fn absent_setting_disables_skills_but_not_agents_or_servers() {
    let fx = Fixture::new();
    let install = fx.plugin_version("review", "acme", "1.0.0");
    fx.installed(json!({"review@acme": [{"scope": "user", "installPath": install}]}));

    let discovery = fx.discovery();
    let skills = discovery.discover_skills(&fx.options()).await;
    assert!(!skills[0].is_enabled);
    let agents = discovery.discover_agents(&fx.options()).await;
    assert!(agents[0].is_enabled);
    let servers = discovery.discover_mcp_servers(&fx.mcp_options()).await;
    assert!(servers.iter().find(|s| s.name == "review-mcp").unwrap().is_enabled);
}

#[tokio::test]
async fn project_settings_override_per_install() {
    let fx = Fixture::new();
    let install = fx.plugin_version("review", "acme", "1.0.0");
    fx.installed(json!({"review@acme": [
        {"scope": "user", "installPath": install},
        {"scope": "local", "installPath": install, "projectPath": fx.project()}
    ]}));
    fx.global_settings(json!({"review@acme": false}));
    fx.write_json(
        fx.project().join(".claude/settings.local.json"),
        json!({"enabledPlugins": {"review@acme": true}}),
    );

    let skills = fx.discovery().discover_skills(&fx.options()).await;
    assert_eq!(skills.len(), 2);
    let user = skills
        .iter()
        .find(|s| s.provenance.plugin_scope == Some(InstallScope::User))
        .unwrap();
    let local = skills
        .iter()
        .find(|s| s.provenance.plugin_scope == Some(InstallScope::Local))
        .unwrap();
    assert!(!user.is_enabled);
    assert!(local.is_enabled);
    assert_eq!(local.provenance.project_root.as_deref(), Some(fx.project()));
    assert_ne!(user.id, local.id);
    assert_eq!(user.path, local.path);
}

#[tokio::test]
async fn stale_install_path_picks_most_recent_version() {
    let fx = Fixture::new();
    let older = fx.plugin_version("review", "acme", "fedcba");
    let newer = fx.plugin_version("review", "acme", "abc123");
    set_mtime(&older, 1_000);
    set_mtime(&newer, 2_000);
    let stale = older.with_file_name("0000000");
    fx.installed(json!({"review@acme": [{"scope": "user", "installPath": stale}]}));
    fx.global_settings(json!({"review@acme": true}));

    let skills = fx.discovery().discover_skills(&fx.options()).await;
    assert_eq!(skills.len(), 1);
    assert!(skills[0].path.starts_with(&newer));
}

#[tokio::test]
async fn marketplace_repo_is_attached() {
    let fx = Fixture::new();
    let install = fx.plugin_version("review", "acme", "1.0.0");
    fx.installed(json!({"review@acme": [{"scope": "user", "installPath": install}]}));
    fx.write_json(
        fx.config().join("plugins/known_marketplaces.json"),
        json!({"acme": {"source": {"source": "git", "url": "https://github.com/acme/plugins.git"}}}),
    );

    let agents = fx.discovery().discover_agents(&fx.options()).await;
    assert_eq!(agents[0].provenance.marketplace_repo.as_deref(), Some("acme/plugins"));
}

#[tokio::test]
async fn mcp_servers_merge_and_redact() {
    let fx = Fixture::new();
    let root = fx.project().to_string_lossy().into_owned();
    fx.write_json(
        fx.home.path().join(".claude.json"),
        json!({
            "mcpServers": {"search": {"type": "http", "url": "https://search.example.com", "headers": {"Authorization": "Bearer hunter2"}}},
            "projects": {root: {"mcpServers": {"db": {"command": "pg-mcp", "env": {"API_KEY": "sk-live-123"}}}}}
        }),
    );
    fx.write_json(
        fx.project().join(".mcp.json"),
        json!({"mcpServers": {"db": {"command": "shadowed"}, "lint": {"command": "lint-mcp"}}}),
    );

    let servers = fx.discovery().discover_mcp_servers(&fx.mcp_options()).await;
    let order: Vec<_> = servers.iter().map(|s| (s.source, s.name.as_str())).collect();
    assert_eq!(
        order,
        vec![
            (McpSource::Project, "db"),
            (McpSource::Project, "lint"),
            (McpSource::Global, "search"),
            (McpSource::BuiltIn, "claude-in-chrome"),
        ]
    );

    let db = &servers[0];
    assert_eq!(db.command.as_deref(), Some("pg-mcp"));
    assert_eq!(db.env_keys, vec!["API_KEY"]);
    assert_eq!(servers[2].header_keys, vec!["Authorization"]);

    let rendered = serde_json::to_string(&servers).unwrap();
    assert!(!rendered.contains("sk-live-123"));
    assert!(!rendered.contains("hunter2"));
}

#[tokio::test]
async fn scope_flags_limit_scanners() {
    let fx = Fixture::new();
    fx.skill(&fx.config().join("skills"), "g", "g");
    fx.skill(&fx.project().join(".claude/skills"), "p", "p");

    let options = DiscoveryOptions {
        include_global: false,
        ..fx.options()
    };
    let skills = fx.discovery().discover_skills(&options).await;
    assert_eq!(names(&skills), vec!["p"]);

    let options = McpDiscoveryOptions {
        include_built_in: false,
        ..fx.mcp_options()
    };
    assert!(fx.discovery().discover_mcp_servers(&options).await.is_empty());
}

#[tokio::test]
async fn global_and_project_agents() {
    let fx = Fixture::new();
    fx.write(
        fx.config().join("agents/reviewer.md"),
        "---\nname: reviewer\ntools: [Read, Grep]\nmodel: sonnet\n---\n",
    );
    fx.write(fx.project().join(".claude/agents/helper.md"), "Helps out.\n");

    let agents = fx.discovery().discover_agents(&fx.options()).await;
    assert_eq!(agents.len(), 2);
    assert_eq!(agents[0].name, "helper");
    assert_eq!(agents[0].source, Source::Project);
    assert_eq!(agents[0].description, "Helps out.");
    assert_eq!(agents[1].tools, vec!["Read", "Grep"]);
    assert_eq!(agents[1].model.as_deref(), Some("sonnet"));
}
